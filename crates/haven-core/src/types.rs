// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the resolver.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::HavenError;

/// One step of the fallback chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Hosted reactive document database.
    Primary,
    /// Conventional REST backend.
    Secondary,
    /// On-device cache.
    Cache,
    /// Hardcoded caller-supplied value.
    Default,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the role an adapter plays in the tier chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Primary,
    Secondary,
    Cache,
}

/// Reference to a generated backend function, e.g. `moods:getRecentMoods`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef(pub String);

impl FunctionRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FunctionRef {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// HTTP verbs the secondary client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A payload held by the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Serialized [`ResourceKey`](crate::ResourceKey).
    pub key: String,
    pub payload: serde_json::Value,
    /// RFC 3339 timestamp of the write. Never used for expiry.
    pub written_at: String,
}

/// A write that no network tier confirmed, awaiting manual replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingMutation {
    pub id: i64,
    pub user_id: String,
    pub resource: String,
    /// Function reference the write was aimed at.
    pub function: String,
    pub payload: serde_json::Value,
    pub created_at: String,
}

/// Input for [`LocalCache::append_pending`](crate::LocalCache::append_pending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPendingMutation {
    pub user_id: String,
    pub resource: String,
    pub function: String,
    pub payload: serde_json::Value,
}

/// A tier that failed before the request was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierFailure {
    pub tier: Tier,
    pub error: String,
}

/// Diagnostic record of how a read was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchAttempt {
    /// Serialized key, or the raw input when the key was invalid.
    pub key: String,
    /// The tier that produced the returned value.
    pub tier: Tier,
    /// Whether the value was written through to the local cache.
    pub cached: bool,
    /// Tiers that failed first, in attempt order.
    pub failures: Vec<TierFailure>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl FetchAttempt {
    /// True when the value came from a network tier.
    pub fn is_fresh(&self) -> bool {
        matches!(self.tier, Tier::Primary | Tier::Secondary)
    }
}

/// Result of a write through the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<R> {
    /// A network tier accepted the write.
    Confirmed { tier: Tier, value: R },
    /// Both network tiers failed; the mutation sits in the pending queue.
    Queued { pending_id: i64 },
}

impl<R> CommitOutcome<R> {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }

    /// The tier that confirmed the write, if any.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Self::Confirmed { tier, .. } => Some(*tier),
            Self::Queued { .. } => None,
        }
    }

    /// For writes with no safe default: a queued write becomes
    /// [`HavenError::QueuedNotConfirmed`].
    pub fn into_confirmed(self) -> Result<R, HavenError> {
        match self {
            Self::Confirmed { value, .. } => Ok(value),
            Self::Queued { pending_id } => Err(HavenError::QueuedNotConfirmed { pending_id }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> CommitOutcome<U> {
        match self {
            Self::Confirmed { tier, value } => CommitOutcome::Confirmed {
                tier,
                value: f(value),
            },
            Self::Queued { pending_id } => CommitOutcome::Queued { pending_id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_renders_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn queued_outcome_refuses_confirmation() {
        let outcome: CommitOutcome<()> = CommitOutcome::Queued { pending_id: 9 };
        assert!(outcome.is_queued());
        assert_eq!(outcome.tier(), None);
        match outcome.into_confirmed() {
            Err(HavenError::QueuedNotConfirmed { pending_id }) => assert_eq!(pending_id, 9),
            other => panic!("expected QueuedNotConfirmed, got {other:?}"),
        }
    }

    #[test]
    fn confirmed_outcome_maps_value() {
        let outcome = CommitOutcome::Confirmed {
            tier: Tier::Secondary,
            value: 2,
        };
        let mapped = outcome.map(|v| v * 10);
        assert_eq!(mapped.tier(), Some(Tier::Secondary));
        assert_eq!(mapped.into_confirmed().unwrap(), 20);
    }

    #[test]
    fn fetch_attempt_freshness() {
        let attempt = FetchAttempt {
            key: "moods_u1".into(),
            tier: Tier::Cache,
            cached: false,
            failures: vec![],
            elapsed: Duration::ZERO,
        };
        assert!(!attempt.is_fresh());
    }
}
