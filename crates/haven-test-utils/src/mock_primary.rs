// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted primary tier.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use haven_core::{
    AdapterType, FunctionRef, HavenError, HealthStatus, PluginAdapter, PrimaryService,
    Subscription,
};

use crate::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Query,
    Mutate,
    Subscribe,
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub function: String,
    pub args: Value,
}

type LiveSender = mpsc::UnboundedSender<Result<Value, HavenError>>;

/// A primary tier whose answers are set by the test.
///
/// Queries and mutations answer independently. Live queries are off by
/// default (`subscribe` fails); [`enable_live`](Self::enable_live) turns them
/// on, after which [`push_live`](Self::push_live) delivers values to every
/// open subscription.
#[derive(Clone)]
pub struct MockPrimary {
    query: Arc<Mutex<Reply>>,
    mutate: Arc<Mutex<Reply>>,
    live: Arc<Mutex<Option<Vec<Value>>>>,
    senders: Arc<Mutex<Vec<LiveSender>>>,
    tokens: Arc<Mutex<Vec<CancellationToken>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockPrimary {
    pub fn new(query: Reply, mutate: Reply) -> Self {
        Self {
            query: Arc::new(Mutex::new(query)),
            mutate: Arc::new(Mutex::new(mutate)),
            live: Arc::new(Mutex::new(None)),
            senders: Arc::new(Mutex::new(Vec::new())),
            tokens: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every query with `value`; mutations echo `{"ok": true}`.
    pub fn succeeding(value: Value) -> Self {
        Self::new(Reply::Value(value), Reply::Value(serde_json::json!({"ok": true})))
    }

    /// Fails every call.
    pub fn failing() -> Self {
        Self::new(
            Reply::fail("primary unreachable"),
            Reply::fail("primary unreachable"),
        )
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self::new(Reply::Hang, Reply::Hang)
    }

    pub async fn set_query(&self, reply: Reply) {
        *self.query.lock().await = reply;
    }

    pub async fn set_mutate(&self, reply: Reply) {
        *self.mutate.lock().await = reply;
    }

    /// Lets `subscribe` succeed; each new subscription first yields `initial`.
    pub async fn enable_live(&self, initial: Vec<Value>) {
        *self.live.lock().await = Some(initial);
    }

    /// Sends `value` to every open subscription.
    pub async fn push_live(&self, value: Value) {
        let mut senders = self.senders.lock().await;
        senders.retain(|tx| tx.send(Ok(value.clone())).is_ok());
    }

    /// Sends an error to every open subscription.
    pub async fn push_live_error(&self, message: &str) {
        let mut senders = self.senders.lock().await;
        senders.retain(|tx| tx.send(Err(HavenError::remote(message))).is_ok());
    }

    /// Cancellation tokens of every subscription handed out, in order.
    pub async fn subscription_tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().await.clone()
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self, kind: CallKind) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    async fn record(&self, kind: CallKind, function: &FunctionRef, args: &Value) {
        self.calls.lock().await.push(RecordedCall {
            kind,
            function: function.to_string(),
            args: args.clone(),
        });
    }
}

async fn answer(reply: Reply) -> Result<Value, HavenError> {
    match reply {
        Reply::Value(value) => Ok(value),
        Reply::Fail(message) => Err(HavenError::remote(message)),
        Reply::Hang => std::future::pending().await,
    }
}

#[async_trait]
impl PluginAdapter for MockPrimary {
    fn name(&self) -> &str {
        "mock-primary"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Primary
    }

    async fn health_check(&self) -> Result<HealthStatus, HavenError> {
        match &*self.query.lock().await {
            Reply::Value(_) => Ok(HealthStatus::Healthy),
            Reply::Fail(message) => Ok(HealthStatus::Unhealthy(message.clone())),
            Reply::Hang => Ok(HealthStatus::Degraded("not answering".into())),
        }
    }

    async fn shutdown(&self) -> Result<(), HavenError> {
        Ok(())
    }
}

#[async_trait]
impl PrimaryService for MockPrimary {
    async fn query(&self, function: &FunctionRef, args: Value) -> Result<Value, HavenError> {
        self.record(CallKind::Query, function, &args).await;
        let reply = self.query.lock().await.clone();
        answer(reply).await
    }

    async fn mutate(&self, function: &FunctionRef, args: Value) -> Result<Value, HavenError> {
        self.record(CallKind::Mutate, function, &args).await;
        let reply = self.mutate.lock().await.clone();
        answer(reply).await
    }

    async fn subscribe(
        &self,
        function: &FunctionRef,
        args: Value,
    ) -> Result<Subscription, HavenError> {
        self.record(CallKind::Subscribe, function, &args).await;
        let Some(initial) = self.live.lock().await.clone() else {
            return Err(HavenError::remote("live queries unavailable"));
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        for value in initial {
            let _ = tx.send(Ok(value));
        }
        self.senders.lock().await.push(tx);

        let cancel = CancellationToken::new();
        self.tokens.lock().await.push(cancel.clone());

        let updates = futures::stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed();
        Ok(Subscription::new(updates, cancel))
    }
}
