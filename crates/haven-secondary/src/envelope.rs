// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `{success, data, error}` response envelope.

use serde::Deserialize;
use serde_json::Value;

/// Envelope returned by the REST backend.
///
/// Failure bodies carry their reason under `error` or `message`
/// depending on the endpoint, as a string or a structured object.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl Envelope {
    /// Best available failure reason.
    pub fn reason(&self) -> String {
        self.error
            .as_ref()
            .and_then(as_text)
            .or_else(|| self.message.as_ref().and_then(as_text))
            .unwrap_or_else(|| "request unsuccessful".to_string())
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Outcome of reading a response body.
#[derive(Debug, PartialEq)]
pub enum Unwrapped {
    /// `success: true`, or a body without an envelope.
    Data(Value),
    /// `success: false` with its reason.
    Failed(String),
}

/// Unwrap a parsed body.
///
/// Bodies that are not envelopes (no boolean `success` field) pass through
/// untouched; some older endpoints return bare arrays.
pub fn unwrap_body(body: Value) -> Unwrapped {
    let is_envelope = body
        .as_object()
        .and_then(|o| o.get("success"))
        .is_some_and(Value::is_boolean);
    if !is_envelope {
        return Unwrapped::Data(body);
    }

    match serde_json::from_value::<Envelope>(body) {
        Ok(env) if env.success => Unwrapped::Data(env.data),
        Ok(env) => Unwrapped::Failed(env.reason()),
        Err(e) => Unwrapped::Failed(format!("malformed envelope: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_yields_data() {
        let body = json!({"success": true, "data": [{"mood": "calm"}]});
        assert_eq!(unwrap_body(body), Unwrapped::Data(json!([{"mood": "calm"}])));
    }

    #[test]
    fn success_without_data_is_null() {
        assert_eq!(
            unwrap_body(json!({"success": true})),
            Unwrapped::Data(Value::Null)
        );
    }

    #[test]
    fn failed_envelope_prefers_error_then_message() {
        let with_error = json!({"success": false, "error": "expired", "message": "ignored"});
        assert_eq!(unwrap_body(with_error), Unwrapped::Failed("expired".into()));

        let with_message = json!({"success": false, "message": "user not found"});
        assert_eq!(
            unwrap_body(with_message),
            Unwrapped::Failed("user not found".into())
        );
    }

    #[test]
    fn success_ignores_structured_error_fields() {
        let body = json!({"success": true, "data": [1], "error": {"code": 0}, "message": null});
        assert_eq!(unwrap_body(body), Unwrapped::Data(json!([1])));
    }

    #[test]
    fn structured_failure_reason_is_rendered() {
        let body = json!({"success": false, "error": null, "message": {"code": "E42"}});
        assert_eq!(
            unwrap_body(body),
            Unwrapped::Failed(r#"{"code":"E42"}"#.into())
        );
    }

    #[test]
    fn bare_bodies_pass_through() {
        assert_eq!(unwrap_body(json!([1, 2])), Unwrapped::Data(json!([1, 2])));
        let not_bool = json!({"success": "yes", "data": 1});
        assert_eq!(unwrap_body(not_bool.clone()), Unwrapped::Data(not_bool));
    }
}
