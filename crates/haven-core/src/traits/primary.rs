// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Primary service trait for the hosted reactive document database.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_core::Stream;
use tokio_util::sync::CancellationToken;

use crate::error::HavenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::FunctionRef;

/// Boxed stream of payload updates.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<serde_json::Value, HavenError>> + Send>>;

/// A live query. Yields a payload each time the backend value changes.
///
/// Dropping the subscription cancels it; the producer observes the
/// cancellation through the shared token and stops.
pub struct Subscription {
    updates: PayloadStream,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn new(updates: PayloadStream, cancel: CancellationToken) -> Self {
        Self { updates, cancel }
    }

    /// Token the producer side watches for teardown.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for Subscription {
    type Item = Result<serde_json::Value, HavenError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().updates.as_mut().poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Client for the hosted backend's generated query/mutation functions.
#[async_trait]
pub trait PrimaryService: PluginAdapter {
    /// One-shot read. Fails with [`HavenError::Remote`]; never retries.
    async fn query(
        &self,
        function: &FunctionRef,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, HavenError>;

    /// One-shot write. Same failure contract as [`query`](Self::query).
    async fn mutate(
        &self,
        function: &FunctionRef,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, HavenError>;

    /// Opens a live query. Fails when the backend is unreachable at open time.
    async fn subscribe(
        &self,
        function: &FunctionRef,
        args: serde_json::Value,
    ) -> Result<Subscription, HavenError>;
}
