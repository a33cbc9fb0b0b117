// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Haven data layer.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Haven configuration.
///
/// A tier whose URL is absent is disabled; the resolver falls straight
/// through it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HavenConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Reactive document database (primary tier).
    #[serde(default)]
    pub primary: PrimaryConfig,

    /// Conventional REST backend (secondary tier).
    #[serde(default)]
    pub secondary: SecondaryConfig,

    /// On-device cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// User the CLI acts for when `--user` is not given.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            user_id: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Primary tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrimaryConfig {
    /// Deployment URL of the document database. `None` disables the tier.
    #[serde(default)]
    pub url: Option<String>,

    /// Bearer identity token issued by the identity provider.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Deadline for a single query or mutation, in milliseconds.
    #[serde(default = "default_primary_timeout_ms")]
    pub timeout_ms: u64,

    /// Re-query interval backing live subscriptions, in milliseconds.
    #[serde(default = "default_subscription_poll_ms")]
    pub subscription_poll_ms: u64,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            url: None,
            auth_token: None,
            timeout_ms: default_primary_timeout_ms(),
            subscription_poll_ms: default_subscription_poll_ms(),
        }
    }
}

fn default_primary_timeout_ms() -> u64 {
    5_000
}

fn default_subscription_poll_ms() -> u64 {
    2_000
}

/// Secondary tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecondaryConfig {
    /// Base URL of the REST backend, e.g. `https://api.example.com/api`. `None` disables the tier.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Optional bearer token sent with every request.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,

    /// Deadline for a single request, in milliseconds.
    #[serde(default = "default_secondary_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            auth_token: None,
            timeout_ms: default_secondary_timeout_ms(),
        }
    }
}

fn default_secondary_timeout_ms() -> u64 {
    8_000
}

/// Local cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Deadline for a single cache operation, in milliseconds.
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            timeout_ms: default_cache_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("haven").join("haven.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "haven.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_cache_timeout_ms() -> u64 {
    2_000
}
