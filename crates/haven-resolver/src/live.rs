// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live view of one resource for a presentation layer.
//!
//! A [`LiveResource`] publishes [`Snapshot`]s on a `watch` channel. It
//! follows the primary tier's live query when one can be opened, and
//! otherwise resolves once through the fallback chain. Dropping it stops
//! the subscription and discards any resolution still in flight.

use std::sync::Arc;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use haven_core::{ResourceKey, Subscription, Tier};

use crate::resolver::{PrimaryCall, Resolution, Resolver, SecondaryCall};
use crate::timeouts::within;

/// What a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub data: T,
    pub loading: bool,
    /// Set when the live query reported an error, or when every tier failed
    /// and `data` is the default.
    pub error: Option<String>,
    /// Tier that produced `data`; `None` until the first value arrives.
    pub tier: Option<Tier>,
}

impl<T> Snapshot<T> {
    fn loading(data: T) -> Self {
        Self {
            data,
            loading: true,
            error: None,
            tier: None,
        }
    }
}

struct Shared<T> {
    resolver: Resolver,
    key: ResourceKey,
    primary: PrimaryCall,
    secondary: SecondaryCall,
    default: T,
    tx: watch::Sender<Snapshot<T>>,
    mounted: CancellationToken,
}

impl<T> Shared<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// One pass through the fallback chain. The result is dropped if the
    /// resource was unmounted meanwhile.
    async fn resolve_once(&self) {
        let resolution = tokio::select! {
            _ = self.mounted.cancelled() => return,
            r = self.resolver.resolve(&self.key, &self.primary, &self.secondary, self.default.clone()) => r,
        };
        self.publish_resolution(resolution);
    }

    fn publish_resolution(&self, resolution: Resolution<T>) {
        if self.mounted.is_cancelled() {
            return;
        }
        let Resolution { value, attempt } = resolution;
        let error = match attempt.tier {
            Tier::Default => attempt.failures.last().map(|f| f.error.clone()),
            _ => None,
        };
        self.tx.send_replace(Snapshot {
            data: value,
            loading: false,
            error,
            tier: Some(attempt.tier),
        });
    }

    async fn open_subscription(&self) -> Option<Subscription> {
        let client = self.resolver.primary()?;
        let opened = within(
            self.resolver.timeouts(),
            Tier::Primary,
            client.subscribe(&self.primary.function, self.primary.args.clone()),
        );
        let result = tokio::select! {
            _ = self.mounted.cancelled() => return None,
            r = opened => r,
        };
        match result {
            Ok(sub) => Some(sub),
            Err(e) => {
                debug!(key = %self.key, error = %e, "live query unavailable, resolving once");
                None
            }
        }
    }

    async fn follow(&self, mut sub: Subscription) {
        loop {
            let item = tokio::select! {
                _ = self.mounted.cancelled() => break,
                item = sub.next() => item,
            };
            match item {
                Some(Ok(payload)) => match serde_json::from_value::<T>(payload) {
                    Ok(data) => {
                        self.tx.send_replace(Snapshot {
                            data,
                            loading: false,
                            error: None,
                            tier: Some(Tier::Primary),
                        });
                    }
                    Err(e) => self.publish_error(format!("unreadable live payload: {e}")),
                },
                Some(Err(e)) => {
                    warn!(key = %self.key, error = %e, "live query error");
                    self.publish_error(e.to_string());
                }
                None => {
                    debug!(key = %self.key, "live query ended");
                    break;
                }
            }
        }
    }

    fn publish_error(&self, error: String) {
        self.tx.send_modify(|s| {
            s.loading = false;
            s.error = Some(error);
        });
    }
}

/// A resource kept current for display.
pub struct LiveResource<T> {
    shared: Arc<Shared<T>>,
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T> LiveResource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Starts loading in the background. The first snapshot is
    /// `{data: default, loading: true}`.
    pub fn start(
        resolver: Resolver,
        key: ResourceKey,
        primary: PrimaryCall,
        secondary: SecondaryCall,
        default: T,
    ) -> Self {
        let (tx, rx) = watch::channel(Snapshot::loading(default.clone()));
        let shared = Arc::new(Shared {
            resolver,
            key,
            primary,
            secondary,
            default,
            tx,
            mounted: CancellationToken::new(),
        });

        let task = Arc::clone(&shared);
        tokio::spawn(async move {
            match task.open_subscription().await {
                Some(sub) => task.follow(sub).await,
                None => task.resolve_once().await,
            }
        });

        Self { shared, rx }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// A receiver for change notifications.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.rx.clone()
    }

    /// Waits for the first non-loading snapshot.
    pub async fn loaded(&mut self) -> Snapshot<T> {
        let loaded = self.rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        loaded.unwrap_or_else(|_| self.rx.borrow().clone())
    }

    /// Manual retry through the fallback chain.
    pub async fn refresh(&self) {
        self.shared.tx.send_modify(|s| s.loading = true);
        self.shared.resolve_once().await;
    }
}

impl<T> Drop for LiveResource<T> {
    fn drop(&mut self) {
        self.shared.mounted.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use haven_test_utils::mock_primary::CallKind;
    use haven_test_utils::{MemoryCache, MockPrimary, MockSecondary, Reply};
    use serde_json::json;

    fn key() -> ResourceKey {
        ResourceKey::new("u1", "settings").unwrap()
    }

    fn calls() -> (PrimaryCall, SecondaryCall) {
        (
            PrimaryCall::new("settings:get", json!({"userId": "u1"})),
            SecondaryCall::get("/settings/u1"),
        )
    }

    #[tokio::test]
    async fn follows_live_query_when_available() {
        let primary = MockPrimary::succeeding(json!(0));
        primary.enable_live(vec![json!(1)]).await;
        let resolver = Resolver::new(Arc::new(MemoryCache::new()))
            .with_primary(Arc::new(primary.clone()));
        let (p, s) = calls();

        let mut live = LiveResource::start(resolver, key(), p, s, -1i64);
        let first = live.loaded().await;
        assert_eq!(first.data, 1);
        assert_eq!(first.tier, Some(Tier::Primary));

        let mut rx = live.subscribe();
        primary.push_live(json!(2)).await;
        let next = rx.wait_for(|s| s.data == 2).await.unwrap().clone();
        assert!(!next.loading);
        assert_eq!(primary.call_count(CallKind::Query).await, 0);

        drop(live);
        let tokens = primary.subscription_tokens().await;
        tokio::time::timeout(Duration::from_secs(1), tokens[0].cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn resolves_once_without_live_query() {
        let primary = MockPrimary::failing();
        let secondary = MockSecondary::succeeding(json!(7));
        let resolver = Resolver::new(Arc::new(MemoryCache::new()))
            .with_primary(Arc::new(primary.clone()))
            .with_secondary(Arc::new(secondary.clone()));
        let (p, s) = calls();

        let mut live = LiveResource::start(resolver, key(), p, s, 0i64);
        let snap = live.loaded().await;
        assert_eq!(snap.data, 7);
        assert_eq!(snap.tier, Some(Tier::Secondary));
        assert_eq!(snap.error, None);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(secondary.request_count().await, 1);
        assert_eq!(primary.call_count(CallKind::Subscribe).await, 1);
    }

    #[tokio::test]
    async fn refresh_retries_the_chain() {
        let secondary = MockSecondary::failing();
        let resolver = Resolver::new(Arc::new(MemoryCache::new()))
            .with_secondary(Arc::new(secondary.clone()));
        let (p, s) = calls();

        let mut live = LiveResource::start(resolver, key(), p, s, 0i64);
        let snap = live.loaded().await;
        assert_eq!(snap.tier, Some(Tier::Default));
        assert!(snap.error.is_some());

        secondary.set_read(Reply::Value(json!(3))).await;
        live.refresh().await;
        let snap = live.snapshot();
        assert_eq!(snap.data, 3);
        assert_eq!(snap.error, None);
        assert!(!snap.loading);
    }

    #[tokio::test]
    async fn unmount_discards_in_flight_resolution() {
        let secondary = MockSecondary::hanging();
        let resolver = Resolver::new(Arc::new(MemoryCache::new()))
            .with_secondary(Arc::new(secondary.clone()))
            .with_timeouts(crate::TierTimeouts::uniform(Duration::from_secs(3600)));
        let (p, s) = calls();

        let live = LiveResource::start(resolver, key(), p, s, 0i64);
        let mut rx = live.subscribe();
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(live);

        // The background task exits and drops the sender without publishing.
        let closed = tokio::time::timeout(Duration::from_secs(1), rx.changed()).await;
        assert!(matches!(closed, Ok(Err(_))));
        assert!(rx.borrow().loading);
    }
}
