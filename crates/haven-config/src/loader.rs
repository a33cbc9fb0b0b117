// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./haven.toml` > `~/.config/haven/haven.toml` > `/etc/haven/haven.toml`
//! with environment variable overrides via the `HAVEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HavenConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/haven/haven.toml`
/// 3. `~/.config/haven/haven.toml`
/// 4. `./haven.toml`
/// 5. `HAVEN_*` environment variables
pub fn load_config() -> Result<HavenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HavenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HavenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HavenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HavenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HavenConfig::default()))
        .merge(Toml::file("/etc/haven/haven.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("haven/haven.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("haven.toml"))
        .merge(env_provider())
}

/// Environment provider mapping `HAVEN_<SECTION>_<KEY>` onto `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `HAVEN_SECONDARY_BASE_URL` must become `secondary.base_url`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("HAVEN_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("primary_", "primary.", 1)
            .replacen("secondary_", "secondary.", 1)
            .replacen("cache_", "cache.", 1);
        mapped.into()
    })
}
