// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tier deadlines.

use std::future::Future;
use std::time::Duration;

use haven_config::model::HavenConfig;
use haven_core::{HavenError, Tier};

/// How long each tier may take before it counts as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTimeouts {
    pub primary: Duration,
    pub secondary: Duration,
    pub cache: Duration,
}

impl TierTimeouts {
    pub fn from_config(config: &HavenConfig) -> Self {
        Self {
            primary: Duration::from_millis(config.primary.timeout_ms),
            secondary: Duration::from_millis(config.secondary.timeout_ms),
            cache: Duration::from_millis(config.cache.timeout_ms),
        }
    }

    /// Same deadline for every tier.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            primary: limit,
            secondary: limit,
            cache: limit,
        }
    }

    pub fn for_tier(&self, tier: Tier) -> Duration {
        match tier {
            Tier::Primary => self.primary,
            Tier::Secondary => self.secondary,
            Tier::Cache | Tier::Default => self.cache,
        }
    }
}

impl Default for TierTimeouts {
    fn default() -> Self {
        Self::from_config(&HavenConfig::default())
    }
}

/// Run `fut` under the deadline for `tier`. Expiry becomes [`HavenError::Timeout`].
pub async fn within<F, T>(timeouts: &TierTimeouts, tier: Tier, fut: F) -> Result<T, HavenError>
where
    F: Future<Output = Result<T, HavenError>>,
{
    let limit = timeouts.for_tier(tier);
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(HavenError::Timeout {
            tier,
            duration: limit,
        }),
    }
}
