// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the document database's function API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use haven_core::{
    AdapterType, FunctionRef, HavenError, HealthStatus, PluginAdapter, PrimaryService,
    Subscription,
};

use crate::watch;
use crate::wire::{FunctionCall, FunctionResult};

/// Which function endpoint a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Query,
    Mutation,
}

impl CallKind {
    fn endpoint(self) -> &'static str {
        match self {
            CallKind::Query => "api/query",
            CallKind::Mutation => "api/mutation",
        }
    }
}

/// Client for a document database deployment.
///
/// Cheap to clone; watch tasks hold their own clone.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
}

impl DocumentClient {
    /// Creates a client for the deployment at `url`.
    ///
    /// `timeout` bounds each HTTP call; `poll_interval` is how often live
    /// queries re-check their value.
    pub fn new(
        url: String,
        auth_token: Option<SecretString>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, HavenError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| HavenError::Config(format!("invalid primary auth token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HavenError::Remote {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            poll_interval,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) async fn call(
        &self,
        kind: CallKind,
        function: &FunctionRef,
        args: &Value,
    ) -> Result<Value, HavenError> {
        let endpoint = format!("{}/{}", self.url, kind.endpoint());
        let response = self
            .client
            .post(&endpoint)
            .json(&FunctionCall::new(function.as_str(), args))
            .send()
            .await
            .map_err(|e| HavenError::Remote {
                message: format!("{function}: request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%function, status = %status, ?kind, "primary response received");

        let body = response.text().await.map_err(|e| HavenError::Remote {
            message: format!("{function}: failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        // Function errors arrive either as 200 with `status: error` or as a
        // 4xx/5xx carrying the same body.
        match serde_json::from_str::<FunctionResult>(&body) {
            Ok(FunctionResult::Success { value }) if status.is_success() => Ok(value),
            Ok(FunctionResult::Success { .. }) => Err(HavenError::remote(format!(
                "{function}: server returned {status}"
            ))),
            Ok(FunctionResult::Error { error_message, .. }) => {
                Err(HavenError::remote(format!("{function}: {error_message}")))
            }
            Err(_) if !status.is_success() => Err(HavenError::remote(format!(
                "{function}: server returned {status}: {body}"
            ))),
            Err(e) => Err(HavenError::Remote {
                message: format!("{function}: malformed response: {e}"),
                source: Some(Box::new(e)),
            }),
        }
    }
}

#[async_trait]
impl PluginAdapter for DocumentClient {
    fn name(&self) -> &str {
        "document-db"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Primary
    }

    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        match self.client.get(&self.url).send().await {
            Ok(resp) if resp.status().is_server_error() => Ok(HealthStatus::Degraded(format!(
                "deployment answered {}",
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
impl PrimaryService for DocumentClient {
    async fn query(&self, function: &FunctionRef, args: Value) -> Result<Value, HavenError> {
        self.call(CallKind::Query, function, &args).await
    }

    async fn mutate(&self, function: &FunctionRef, args: Value) -> Result<Value, HavenError> {
        self.call(CallKind::Mutation, function, &args).await
    }

    async fn subscribe(
        &self,
        function: &FunctionRef,
        args: Value,
    ) -> Result<Subscription, HavenError> {
        watch::spawn(self.clone(), function.clone(), args, self.poll_interval).await
    }
}
