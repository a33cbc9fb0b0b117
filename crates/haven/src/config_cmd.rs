// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haven config check|show`.

use haven_config::HavenConfig;
use haven_core::HavenError;

use crate::output::Output;

/// Reached only when loading and validation already passed.
pub fn check(config: &HavenConfig, out: Output) -> Result<(), HavenError> {
    if out.json {
        return out.print_json(&serde_json::json!({
            "valid": true,
            "primary": config.primary.url.is_some(),
            "secondary": config.secondary.base_url.is_some(),
            "cache": config.cache.database_path,
        }));
    }
    println!("configuration OK");
    println!(
        "  primary:   {}",
        config.primary.url.as_deref().unwrap_or("disabled")
    );
    println!(
        "  secondary: {}",
        config.secondary.base_url.as_deref().unwrap_or("disabled")
    );
    println!("  cache:     {}", config.cache.database_path);
    Ok(())
}

/// Effective configuration as TOML. Tokens are never serialized.
pub fn show(config: &HavenConfig) -> Result<(), HavenError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| HavenError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
