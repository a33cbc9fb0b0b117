// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tiered resolver.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;

use haven_core::{
    CommitOutcome, FetchAttempt, FunctionRef, HavenError, HttpMethod, LocalCache,
    NewPendingMutation, PrimaryService, ResourceKey, SecondaryService, Tier, TierFailure,
};

use crate::observer::{ResolverObserver, TracingObserver};
use crate::timeouts::{within, TierTimeouts};

/// A call against the primary tier: function reference plus arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryCall {
    pub function: FunctionRef,
    pub args: Value,
}

impl PrimaryCall {
    pub fn new(function: impl Into<String>, args: Value) -> Self {
        Self {
            function: FunctionRef::new(function),
            args,
        }
    }
}

/// A call against the secondary tier.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryCall {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl SecondaryCall {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::with_body(HttpMethod::Post, path, body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::with_body(HttpMethod::Put, path, body)
    }

    pub fn with_body(method: HttpMethod, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A resolved value and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub value: T,
    pub attempt: FetchAttempt,
}

impl<T> Resolution<T> {
    pub fn tier(&self) -> Tier {
        self.attempt.tier
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Routes reads and writes across the tiers.
///
/// Clients are injected; a missing network client means that tier is
/// disabled and fails immediately with [`HavenError::TierDisabled`].
#[derive(Clone)]
pub struct Resolver {
    primary: Option<Arc<dyn PrimaryService>>,
    secondary: Option<Arc<dyn SecondaryService>>,
    cache: Arc<dyn LocalCache>,
    timeouts: TierTimeouts,
    observer: Arc<dyn ResolverObserver>,
}

impl Resolver {
    /// A resolver with both network tiers disabled.
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self {
            primary: None,
            secondary: None,
            cache,
            timeouts: TierTimeouts::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_primary(mut self, primary: Arc<dyn PrimaryService>) -> Self {
        self.primary = Some(primary);
        self
    }

    pub fn with_secondary(mut self, secondary: Arc<dyn SecondaryService>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn with_timeouts(mut self, timeouts: TierTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ResolverObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn primary(&self) -> Option<&Arc<dyn PrimaryService>> {
        self.primary.as_ref()
    }

    pub fn secondary(&self) -> Option<&Arc<dyn SecondaryService>> {
        self.secondary.as_ref()
    }

    pub fn cache(&self) -> &Arc<dyn LocalCache> {
        &self.cache
    }

    pub fn timeouts(&self) -> &TierTimeouts {
        &self.timeouts
    }

    /// Read `key`, falling back primary, secondary, cache, `default`.
    ///
    /// Never fails. A network payload that does not decode as `T` counts as
    /// a failure of that tier. Successful network reads are written through
    /// to the cache on a best-effort basis.
    pub async fn resolve<T: DeserializeOwned>(
        &self,
        key: &ResourceKey,
        primary: &PrimaryCall,
        secondary: &SecondaryCall,
        default: T,
    ) -> Resolution<T> {
        let started = Instant::now();
        let raw_key = key.storage_key();
        let mut failures = Vec::new();

        for tier in [Tier::Primary, Tier::Secondary] {
            let fetched = match tier {
                Tier::Primary => self.fetch_primary(primary).await,
                _ => self.fetch_secondary(secondary).await,
            };
            match fetched.and_then(|payload| decode::<T>(&payload).map(|v| (v, payload))) {
                Ok((value, payload)) => {
                    let cached = self.write_through(key, &payload).await;
                    return self.finish(raw_key, tier, cached, failures, started, value);
                }
                Err(e) => self.record_failure(&raw_key, tier, e, &mut failures),
            }
        }

        let from_cache = within(&self.timeouts, Tier::Cache, self.cache.get(key))
            .await
            .and_then(|entry| decode::<T>(&entry.payload));
        match from_cache {
            Ok(value) => self.finish(raw_key, Tier::Cache, false, failures, started, value),
            Err(e) => {
                self.record_failure(&raw_key, Tier::Cache, e, &mut failures);
                self.finish(raw_key, Tier::Default, false, failures, started, default)
            }
        }
    }

    /// The read path for a key that failed validation: straight to `default`,
    /// no tier is touched.
    pub fn resolve_invalid<T>(
        &self,
        raw_key: impl Into<String>,
        error: &HavenError,
        default: T,
    ) -> Resolution<T> {
        let raw_key = raw_key.into();
        self.observer.invalid_key(&raw_key, error);
        let attempt = FetchAttempt {
            key: raw_key,
            tier: Tier::Default,
            cached: false,
            failures: Vec::new(),
            elapsed: Default::default(),
        };
        self.observer.resolved(&attempt);
        Resolution {
            value: default,
            attempt,
        }
    }

    /// Resolve a key that may not have been built successfully.
    pub async fn resolve_key<T: DeserializeOwned>(
        &self,
        key: Result<ResourceKey, HavenError>,
        raw_key: &str,
        primary: &PrimaryCall,
        secondary: &SecondaryCall,
        default: T,
    ) -> Resolution<T> {
        match key {
            Ok(key) => self.resolve(&key, primary, secondary, default).await,
            Err(e) => self.resolve_invalid(raw_key, &e, default),
        }
    }

    /// Write through primary, then secondary, then the pending queue.
    ///
    /// A confirmed write invalidates every cached variant of the key's
    /// `(user, resource)` scope. Errors only when the pending append itself
    /// fails, since then nothing durable exists.
    pub async fn commit(
        &self,
        key: &ResourceKey,
        primary: &PrimaryCall,
        secondary: &SecondaryCall,
        mutation: NewPendingMutation,
    ) -> Result<CommitOutcome<Value>, HavenError> {
        let raw_key = key.storage_key();
        let mut failures = Vec::new();

        let by_primary = match &self.primary {
            Some(client) => {
                within(
                    &self.timeouts,
                    Tier::Primary,
                    client.mutate(&primary.function, primary.args.clone()),
                )
                .await
            }
            None => Err(HavenError::TierDisabled(Tier::Primary)),
        };
        let confirmed = match by_primary {
            Ok(value) => Some((Tier::Primary, value)),
            Err(e) => {
                self.record_failure(&raw_key, Tier::Primary, e, &mut failures);
                match self.fetch_secondary(secondary).await {
                    Ok(value) => Some((Tier::Secondary, value)),
                    Err(e) => {
                        self.record_failure(&raw_key, Tier::Secondary, e, &mut failures);
                        None
                    }
                }
            }
        };

        if let Some((tier, value)) = confirmed {
            if let Err(e) = within(&self.timeouts, Tier::Cache, self.cache.invalidate(key)).await {
                self.observer.invalidation_failed(key, &e);
            }
            self.observer.committed(key, tier);
            return Ok(CommitOutcome::Confirmed { tier, value });
        }

        let pending_id = within(
            &self.timeouts,
            Tier::Cache,
            self.cache.append_pending(&mutation),
        )
        .await?;
        self.observer.queued(&mutation, pending_id);
        Ok(CommitOutcome::Queued { pending_id })
    }

    async fn fetch_primary(&self, call: &PrimaryCall) -> Result<Value, HavenError> {
        let Some(client) = &self.primary else {
            return Err(HavenError::TierDisabled(Tier::Primary));
        };
        within(
            &self.timeouts,
            Tier::Primary,
            client.query(&call.function, call.args.clone()),
        )
        .await
    }

    async fn fetch_secondary(&self, call: &SecondaryCall) -> Result<Value, HavenError> {
        let Some(client) = &self.secondary else {
            return Err(HavenError::TierDisabled(Tier::Secondary));
        };
        within(
            &self.timeouts,
            Tier::Secondary,
            client.request(call.method, &call.path, call.body.clone()),
        )
        .await
    }

    async fn write_through(&self, key: &ResourceKey, payload: &Value) -> bool {
        match within(&self.timeouts, Tier::Cache, self.cache.put(key, payload)).await {
            Ok(()) => true,
            Err(e) => {
                self.observer.cache_write_failed(key, &e);
                false
            }
        }
    }

    fn record_failure(
        &self,
        raw_key: &str,
        tier: Tier,
        error: HavenError,
        failures: &mut Vec<TierFailure>,
    ) {
        self.observer.tier_failed(raw_key, tier, &error);
        failures.push(TierFailure {
            tier,
            error: error.to_string(),
        });
    }

    fn finish<T>(
        &self,
        key: String,
        tier: Tier,
        cached: bool,
        failures: Vec<TierFailure>,
        started: Instant,
        value: T,
    ) -> Resolution<T> {
        let attempt = FetchAttempt {
            key,
            tier,
            cached,
            failures,
            elapsed: started.elapsed(),
        };
        self.observer.resolved(&attempt);
        Resolution { value, attempt }
    }
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T, HavenError> {
    serde_json::from_value(payload.clone()).map_err(HavenError::from)
}
