// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the REST backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use haven_core::{AdapterType, HavenError, HealthStatus, HttpMethod, PluginAdapter, SecondaryService};

use crate::envelope::{unwrap_body, Unwrapped};

/// Client for the conventional REST backend.
///
/// Holds one pooled `reqwest::Client`; cloning is cheap.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// The bearer token, when given, is attached to every request as a
    /// sensitive header.
    pub fn new(
        base_url: String,
        auth_token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, HavenError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        if let Some(token) = auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| HavenError::Config(format!("invalid secondary auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HavenError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl PluginAdapter for RestClient {
    fn name(&self) -> &str {
        "rest"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Secondary
    }

    /// Any HTTP answer from the base URL counts as reachable; 5xx is degraded.
    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        match self.client.get(&self.base_url).send().await {
            Ok(resp) if resp.status().is_server_error() => Ok(HealthStatus::Degraded(format!(
                "backend answered {}",
                resp.status()
            ))),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), HavenError> {
        Ok(())
    }
}

#[async_trait]
impl SecondaryService for RestClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, HavenError> {
        let url = self.url(path);
        let mut req = self.client.request(to_reqwest(method), &url);
        if let Some(body) = &body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| HavenError::Http {
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            message: format!("request to {url} failed: {e}"),
        })?;

        let status = response.status();
        debug!(%method, %url, status = %status, "secondary response received");

        let text = response.text().await.map_err(|e| HavenError::Http {
            status: status.as_u16(),
            message: format!("failed to read response body: {e}"),
        })?;
        let parsed: Option<serde_json::Value> = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };

        if !status.is_success() {
            let message = parsed
                .map(|v| match unwrap_body(v) {
                    Unwrapped::Failed(reason) => reason,
                    Unwrapped::Data(other) => other.to_string(),
                })
                .unwrap_or(text);
            return Err(HavenError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let Some(body) = parsed else {
            if text.trim().is_empty() {
                return Ok(serde_json::Value::Null);
            }
            return Err(HavenError::Http {
                status: status.as_u16(),
                message: "response body is not JSON".to_string(),
            });
        };

        match unwrap_body(body) {
            Unwrapped::Data(data) => Ok(data),
            Unwrapped::Failed(reason) => Err(HavenError::Http {
                status: status.as_u16(),
                message: reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, token: Option<&str>) -> RestClient {
        RestClient::new(
            base_url.to_string(),
            token.map(|t| SecretString::from(t.to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn get_unwraps_success_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/moods/u1"))
            .and(query_param("days", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{"mood": "calm", "intensity": 6}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        let data = client
            .request(HttpMethod::Get, "/moods/u1?days=7", None)
            .await
            .unwrap();
        assert_eq!(data, json!([{"mood": "calm", "intensity": 6}]));
    }

    #[tokio::test]
    async fn post_sends_json_body_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assessments"))
            .and(header("authorization", "Bearer t0ken"))
            .and(body_json(json!({"kind": "phq9", "totalScore": 12})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({"success": true, "data": {"id": "a1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()), Some("t0ken"));
        let data = client
            .request(
                HttpMethod::Post,
                "assessments",
                Some(json!({"kind": "phq9", "totalScore": 12})),
            )
            .await
            .unwrap();
        assert_eq!(data, json!({"id": "a1"}));
    }

    #[tokio::test]
    async fn non_2xx_is_http_error_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"success": false, "error": "maintenance"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        let err = client
            .request(HttpMethod::Get, "/settings/u1", None)
            .await
            .unwrap_err();
        match err {
            HavenError::Http { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsuccessful_envelope_on_200_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "no such user"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        let err = client
            .request(HttpMethod::Get, "/moods/ghost", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Http { status: 200, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn transport_failure_has_status_zero() {
        // Nothing listens on port 9 on the loopback interface.
        let client = test_client("http://127.0.0.1:9", None);
        let err = client
            .request(HttpMethod::Get, "/moods/u1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Http { status: 0, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        let data = client
            .request(HttpMethod::Delete, "/messages/m1", None)
            .await
            .unwrap();
        assert_eq!(data, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn health_check_reports_degraded_on_5xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        assert!(matches!(
            client.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
