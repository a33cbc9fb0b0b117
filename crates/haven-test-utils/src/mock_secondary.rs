// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted secondary tier.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use haven_core::{
    AdapterType, HavenError, HealthStatus, HttpMethod, PluginAdapter, SecondaryService,
};

use crate::Reply;

/// One recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// A REST backend whose answers are set by the test.
///
/// Reads (`GET`) and writes (everything else) answer independently.
/// Failures carry status 503.
#[derive(Clone)]
pub struct MockSecondary {
    read: Arc<Mutex<Reply>>,
    write: Arc<Mutex<Reply>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockSecondary {
    pub fn new(read: Reply, write: Reply) -> Self {
        Self {
            read: Arc::new(Mutex::new(read)),
            write: Arc::new(Mutex::new(write)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding(value: Value) -> Self {
        Self::new(Reply::Value(value), Reply::Value(serde_json::json!({"ok": true})))
    }

    pub fn failing() -> Self {
        Self::new(
            Reply::fail("service unavailable"),
            Reply::fail("service unavailable"),
        )
    }

    pub fn hanging() -> Self {
        Self::new(Reply::Hang, Reply::Hang)
    }

    pub async fn set_read(&self, reply: Reply) {
        *self.read.lock().await = reply;
    }

    pub async fn set_write(&self, reply: Reply) {
        *self.write.lock().await = reply;
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockSecondary {
    fn name(&self) -> &str {
        "mock-secondary"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Secondary
    }

    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), HavenError> {
        Ok(())
    }
}

#[async_trait]
impl SecondaryService for MockSecondary {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, HavenError> {
        self.requests.lock().await.push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        let reply = match method {
            HttpMethod::Get => self.read.lock().await.clone(),
            _ => self.write.lock().await.clone(),
        };
        match reply {
            Reply::Value(value) => Ok(value),
            Reply::Fail(message) => Err(HavenError::Http {
                status: 503,
                message,
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn reads_and_writes_answer_independently() {
        let mock = MockSecondary::new(Reply::Value(json!([1])), Reply::fail("read only"));
        assert_eq!(
            mock.request(HttpMethod::Get, "/moods/u1", None).await.unwrap(),
            json!([1])
        );
        let err = mock
            .request(HttpMethod::Post, "/moods", Some(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, HavenError::Http { status: 503, .. }));
        assert_eq!(mock.request_count().await, 2);
    }
}
