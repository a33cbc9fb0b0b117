// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback and write-path behaviour against a real SQLite cache.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use haven_config::model::CacheConfig;
use haven_core::{
    CommitOutcome, HavenError, LocalCache, NewPendingMutation, ResourceKey, Tier,
};
use haven_resolver::{
    PrimaryCall, Resolution, Resolver, ResolverObserver, SecondaryCall, TierTimeouts,
};
use haven_storage::SqliteCache;
use haven_test_utils::{MemoryCache, MockPrimary, MockSecondary, Reply};
use serde_json::{json, Value};
use tempfile::TempDir;

async fn sqlite_cache() -> (TempDir, Arc<SqliteCache>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haven.db");
    let cache = SqliteCache::open(CacheConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode: true,
        timeout_ms: 2_000,
    })
    .await
    .unwrap();
    (dir, Arc::new(cache))
}

fn assessments_key() -> ResourceKey {
    ResourceKey::new("user-42", "assessments")
        .unwrap()
        .with_param("limit", 10)
}

fn read_calls() -> (PrimaryCall, SecondaryCall) {
    (
        PrimaryCall::new(
            "assessments:getHistory",
            json!({"userId": "user-42", "limit": 10}),
        ),
        SecondaryCall::get("/assessments/user-42?limit=10"),
    )
}

fn mutation(payload: Value) -> NewPendingMutation {
    NewPendingMutation {
        user_id: "user-42".into(),
        resource: "assessments".into(),
        function: "assessments:submit".into(),
        payload,
    }
}

fn write_calls(payload: &Value) -> (PrimaryCall, SecondaryCall) {
    (
        PrimaryCall::new("assessments:submit", payload.clone()),
        SecondaryCall::post("/assessments", payload.clone()),
    )
}

#[tokio::test]
async fn primary_result_is_returned_and_cached() {
    let (_dir, cache) = sqlite_cache().await;
    let key = assessments_key();
    let (p, s) = read_calls();
    let payload = json!([{"kind": "gad7", "totalScore": 9}]);

    let online = Resolver::new(cache.clone())
        .with_primary(Arc::new(MockPrimary::succeeding(payload.clone())))
        .with_secondary(Arc::new(MockSecondary::succeeding(json!([]))));
    let r: Resolution<Value> = online.resolve(&key, &p, &s, json!(null)).await;
    assert_eq!(r.value, payload);
    assert_eq!(r.tier(), Tier::Primary);

    // Both network tiers gone: the cache must now answer with the same value.
    let offline = Resolver::new(cache.clone());
    let r: Resolution<Value> = offline.resolve(&key, &p, &s, json!(null)).await;
    assert_eq!(r.value, payload);
    assert_eq!(r.tier(), Tier::Cache);
}

#[tokio::test]
async fn secondary_result_wins_over_primary_error() {
    let (_dir, cache) = sqlite_cache().await;
    let (p, s) = read_calls();
    let resolver = Resolver::new(cache)
        .with_primary(Arc::new(MockPrimary::failing()))
        .with_secondary(Arc::new(MockSecondary::succeeding(json!({"from": "rest"}))));

    let r: Resolution<Value> = resolver.resolve(&assessments_key(), &p, &s, json!(null)).await;
    assert_eq!(r.value, json!({"from": "rest"}));
    assert_eq!(r.tier(), Tier::Secondary);
    assert_eq!(r.attempt.failures.len(), 1);
    assert_eq!(r.attempt.failures[0].tier, Tier::Primary);
}

#[tokio::test]
async fn cached_value_is_returned_unchanged_when_network_fails() {
    let (_dir, cache) = sqlite_cache().await;
    let key = assessments_key();
    let stored = json!({"nested": {"values": [1, 2.5, "x", null, true]}, "empty": {}});
    cache.put(&key, &stored).await.unwrap();

    let (p, s) = read_calls();
    let resolver = Resolver::new(cache.clone())
        .with_primary(Arc::new(MockPrimary::failing()))
        .with_secondary(Arc::new(MockSecondary::failing()));

    for _ in 0..2 {
        let r: Resolution<Value> = resolver.resolve(&key, &p, &s, json!(null)).await;
        assert_eq!(r.value, stored);
        assert_eq!(r.tier(), Tier::Cache);
        assert!(!r.attempt.is_fresh());
    }
}

#[tokio::test]
async fn scenario_a_empty_cache_yields_default() {
    let (_dir, cache) = sqlite_cache().await;
    let (p, s) = read_calls();
    let resolver = Resolver::new(cache)
        .with_primary(Arc::new(MockPrimary::failing()))
        .with_secondary(Arc::new(MockSecondary::failing()));

    let r: Resolution<Vec<Value>> = resolver.resolve(&assessments_key(), &p, &s, vec![]).await;
    assert!(r.value.is_empty());
    assert_eq!(r.tier(), Tier::Default);
    assert_eq!(r.attempt.failures.len(), 3);
}

#[tokio::test]
async fn scenario_b_primary_value_lands_in_cache() {
    let (_dir, cache) = sqlite_cache().await;
    let key = ResourceKey::new("user-42", "latest_assessment").unwrap();
    let resolver = Resolver::new(cache.clone())
        .with_primary(Arc::new(MockPrimary::succeeding(json!({"score": 28}))));

    let r: Resolution<Option<Value>> = resolver
        .resolve(
            &key,
            &PrimaryCall::new("assessments:getLatest", json!({"userId": "user-42"})),
            &SecondaryCall::get("/assessments/user-42/latest"),
            None,
        )
        .await;
    assert_eq!(r.value, Some(json!({"score": 28})));
    assert_eq!(cache.get(&key).await.unwrap().payload, json!({"score": 28}));
}

#[tokio::test]
async fn scenario_c_failed_commit_is_queued() {
    let (_dir, cache) = sqlite_cache().await;
    let resolver = Resolver::new(cache.clone())
        .with_primary(Arc::new(MockPrimary::failing()))
        .with_secondary(Arc::new(MockSecondary::failing()));

    let payload = json!({"type": "assessment", "totalScore": 35});
    let (p, s) = write_calls(&payload);
    let outcome = resolver
        .commit(&assessments_key(), &p, &s, mutation(payload.clone()))
        .await
        .unwrap();
    assert!(outcome.is_queued());

    let pending = cache.pending().await.unwrap();
    assert_eq!(pending.last().unwrap().payload, payload);
}

#[tokio::test]
async fn successful_commit_invalidates_every_cached_variant() {
    let (_dir, cache) = sqlite_cache().await;
    let key = assessments_key();
    let (p, s) = read_calls();

    let primary = MockPrimary::succeeding(json!(["before"]));
    let resolver = Resolver::new(cache.clone()).with_primary(Arc::new(primary.clone()));
    let _: Resolution<Value> = resolver.resolve(&key, &p, &s, json!(null)).await;
    let other = ResourceKey::new("user-42", "assessments").unwrap().with_param("limit", 1);
    cache.put(&other, &json!(["before"])).await.unwrap();

    let payload = json!({"kind": "phq9", "totalScore": 4});
    let (wp, ws) = write_calls(&payload);
    let outcome = resolver
        .commit(&ResourceKey::new("user-42", "assessments").unwrap(), &wp, &ws, mutation(payload))
        .await
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::Confirmed { tier: Tier::Primary, .. }));

    // Network down after the write: no stale pre-commit value may come back.
    primary.set_query(Reply::fail("offline")).await;
    let r: Resolution<Value> = resolver.resolve(&key, &p, &s, json!("default")).await;
    assert_eq!(r.value, json!("default"));
    assert!(matches!(cache.get(&other).await, Err(HavenError::NotFound(_))));
}

#[tokio::test]
async fn queued_commits_accumulate_in_call_order() {
    let (_dir, cache) = sqlite_cache().await;
    let resolver = Resolver::new(cache.clone())
        .with_primary(Arc::new(MockPrimary::failing()))
        .with_secondary(Arc::new(MockSecondary::failing()));

    let first = json!({"kind": "phq9", "totalScore": 11});
    let second = json!({"kind": "gad7", "totalScore": 3});
    for payload in [&first, &second] {
        let (p, s) = write_calls(payload);
        resolver
            .commit(&assessments_key(), &p, &s, mutation(payload.clone()))
            .await
            .unwrap();
    }

    let payloads: Vec<Value> = cache
        .pending()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.payload)
        .collect();
    assert_eq!(payloads, vec![first, second]);
}

#[tokio::test]
async fn invalid_key_never_reaches_a_network_tier() {
    let primary = MockPrimary::succeeding(json!(["remote"]));
    let secondary = MockSecondary::succeeding(json!(["remote"]));
    let resolver = Resolver::new(Arc::new(MemoryCache::new()))
        .with_primary(Arc::new(primary.clone()))
        .with_secondary(Arc::new(secondary.clone()));
    let (p, s) = read_calls();

    let r: Resolution<Vec<String>> = resolver
        .resolve_key(ResourceKey::new("", "moods"), "moods_", &p, &s, vec![])
        .await;
    assert!(r.value.is_empty());
    assert_eq!(r.tier(), Tier::Default);
    assert!(primary.calls().await.is_empty());
    assert_eq!(secondary.request_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn hung_tiers_time_out_in_order() {
    let cache = MemoryCache::new();
    cache.seed(&assessments_key(), json!(["cached"])).await;
    let resolver = Resolver::new(Arc::new(cache))
        .with_primary(Arc::new(MockPrimary::hanging()))
        .with_secondary(Arc::new(MockSecondary::hanging()))
        .with_timeouts(TierTimeouts {
            primary: Duration::from_millis(300),
            secondary: Duration::from_millis(500),
            cache: Duration::from_millis(100),
        });
    let (p, s) = read_calls();

    let r: Resolution<Value> = resolver.resolve(&assessments_key(), &p, &s, json!(null)).await;
    assert_eq!(r.value, json!(["cached"]));
    assert_eq!(r.tier(), Tier::Cache);
    let failed: Vec<Tier> = r.attempt.failures.iter().map(|f| f.tier).collect();
    assert_eq!(failed, vec![Tier::Primary, Tier::Secondary]);
}

#[derive(Default)]
struct Recording {
    cache_write_failures: Mutex<Vec<String>>,
    invalidation_failures: Mutex<Vec<String>>,
}

impl ResolverObserver for Recording {
    fn cache_write_failed(&self, key: &ResourceKey, error: &HavenError) {
        if let Ok(mut seen) = self.cache_write_failures.lock() {
            seen.push(format!("{key}: {error}"));
        }
    }

    fn invalidation_failed(&self, key: &ResourceKey, error: &HavenError) {
        if let Ok(mut seen) = self.invalidation_failures.lock() {
            seen.push(format!("{key}: {error}"));
        }
    }
}

#[tokio::test]
async fn cache_write_failure_reaches_observer_but_not_result() {
    let cache = MemoryCache::new();
    cache.fail_writes(true);
    let observer = Arc::new(Recording::default());
    let resolver = Resolver::new(Arc::new(cache.clone()))
        .with_primary(Arc::new(MockPrimary::succeeding(json!([1]))))
        .with_observer(observer.clone());
    let (p, s) = read_calls();

    let r: Resolution<Vec<i32>> = resolver.resolve(&assessments_key(), &p, &s, vec![]).await;
    assert_eq!(r.value, vec![1]);
    assert_eq!(r.tier(), Tier::Primary);
    assert!(!r.attempt.cached);

    let seen = observer.cache_write_failures.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("assessments_user-42"));
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn failed_invalidation_still_confirms_and_leaves_stale_entry() {
    let cache = MemoryCache::new();
    cache.seed(&assessments_key(), json!(["before"])).await;
    cache.fail_writes(true);
    let observer = Arc::new(Recording::default());
    let resolver = Resolver::new(Arc::new(cache.clone()))
        .with_primary(Arc::new(MockPrimary::succeeding(json!([]))))
        .with_observer(observer.clone());
    let payload = json!({"kind": "phq9", "answers": [1, 1, 1, 1, 1, 1, 1, 1, 1]});
    let (wp, ws) = write_calls(&payload);

    let outcome = resolver
        .commit(&ResourceKey::new("user-42", "assessments").unwrap(), &wp, &ws, mutation(payload))
        .await
        .unwrap();
    assert!(matches!(outcome, CommitOutcome::Confirmed { tier: Tier::Primary, .. }));
    assert!(cache.pending().await.unwrap().is_empty());

    let seen = observer.invalidation_failures.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("assessments_user-42"));

    // The old variant survives, so an offline read still serves it.
    let offline = Resolver::new(Arc::new(cache.clone()));
    let (p, s) = read_calls();
    let r: Resolution<Value> = offline.resolve(&assessments_key(), &p, &s, json!(null)).await;
    assert_eq!(r.tier(), Tier::Cache);
    assert_eq!(r.value, json!(["before"]));
}
