// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic hook for resolver outcomes.
//!
//! The resolver swallows tier failures and best-effort cache writes. An
//! observer sees all of them without being able to change what the caller
//! gets back.

use haven_core::{FetchAttempt, HavenError, NewPendingMutation, ResourceKey, Tier};
use metrics::describe_counter;
use tracing::{debug, info, warn};

/// Receives resolver events. Every method defaults to doing nothing.
pub trait ResolverObserver: Send + Sync {
    /// A tier failed and the resolver moved on.
    fn tier_failed(&self, _key: &str, _tier: Tier, _error: &HavenError) {}

    /// Write-through after a network read did not land in the cache.
    fn cache_write_failed(&self, _key: &ResourceKey, _error: &HavenError) {}

    /// Post-commit invalidation did not complete; stale entries may remain.
    fn invalidation_failed(&self, _key: &ResourceKey, _error: &HavenError) {}

    /// A read finished.
    fn resolved(&self, _attempt: &FetchAttempt) {}

    /// A write was confirmed by `tier`.
    fn committed(&self, _key: &ResourceKey, _tier: Tier) {}

    /// A write fell through to the pending queue.
    fn queued(&self, _mutation: &NewPendingMutation, _pending_id: i64) {}

    /// A read was short-circuited to its default because the key was invalid.
    fn invalid_key(&self, _raw_key: &str, _error: &HavenError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ResolverObserver for NoopObserver {}

/// Default observer: structured logs plus `metrics` counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    /// Register counter descriptions with the installed recorder.
    pub fn describe_metrics() {
        describe_counter!("haven_resolve_total", "Reads by the tier that satisfied them");
        describe_counter!("haven_tier_failures_total", "Tier attempts that failed");
        describe_counter!(
            "haven_cache_write_failures_total",
            "Write-through and invalidation failures"
        );
        describe_counter!("haven_commits_total", "Writes by outcome");
    }
}

impl ResolverObserver for TracingObserver {
    fn tier_failed(&self, key: &str, tier: Tier, error: &HavenError) {
        debug!(%key, %tier, error = %error, "tier failed, falling back");
        metrics::counter!("haven_tier_failures_total", "tier" => tier.to_string()).increment(1);
    }

    fn cache_write_failed(&self, key: &ResourceKey, error: &HavenError) {
        warn!(%key, error = %error, "cache write-through failed");
        metrics::counter!("haven_cache_write_failures_total", "op" => "put").increment(1);
    }

    fn invalidation_failed(&self, key: &ResourceKey, error: &HavenError) {
        warn!(%key, error = %error, "cache invalidation failed");
        metrics::counter!("haven_cache_write_failures_total", "op" => "invalidate").increment(1);
    }

    fn resolved(&self, attempt: &FetchAttempt) {
        debug!(
            key = %attempt.key,
            tier = %attempt.tier,
            cached = attempt.cached,
            failures = attempt.failures.len(),
            elapsed_ms = attempt.elapsed.as_millis() as u64,
            "resolved"
        );
        metrics::counter!("haven_resolve_total", "tier" => attempt.tier.to_string()).increment(1);
    }

    fn committed(&self, key: &ResourceKey, tier: Tier) {
        debug!(%key, %tier, "write confirmed");
        metrics::counter!("haven_commits_total", "outcome" => tier.to_string()).increment(1);
    }

    fn queued(&self, mutation: &NewPendingMutation, pending_id: i64) {
        info!(
            pending_id,
            user_id = %mutation.user_id,
            resource = %mutation.resource,
            function = %mutation.function,
            "write queued locally, will sync later"
        );
        metrics::counter!("haven_commits_total", "outcome" => "queued").increment(1);
    }

    fn invalid_key(&self, raw_key: &str, error: &HavenError) {
        warn!(key = %raw_key, error = %error, "invalid resource key, using default");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn tracing_observer_logs_cache_write_failures() {
        let key = ResourceKey::new("u1", "moods").unwrap();
        let err = HavenError::storage(std::io::Error::other("disk full"));
        TracingObserver.cache_write_failed(&key, &err);
        assert!(logs_contain("cache write-through failed"));
        assert!(logs_contain("disk full"));
    }

    #[test]
    fn noop_observer_accepts_events() {
        let key = ResourceKey::new("u1", "moods").unwrap();
        NoopObserver.committed(&key, Tier::Primary);
        NoopObserver.invalid_key("moods_", &HavenError::InvalidKey("empty user id".into()));
    }
}
