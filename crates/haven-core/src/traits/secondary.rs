// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secondary service trait for the conventional REST backend.

use async_trait::async_trait;

use crate::error::HavenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::HttpMethod;

/// Request/response client used when the primary tier is unavailable.
#[async_trait]
pub trait SecondaryService: PluginAdapter {
    /// Issues a single request and returns the unwrapped `data` payload.
    ///
    /// Fails with [`HavenError::Http`] on a non-2xx status, a `success: false`
    /// envelope, or a transport failure (status 0). Never retries.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, HavenError>;
}
