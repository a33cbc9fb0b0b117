// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haven pending` subcommands.
//!
//! Queued writes are never replayed automatically; these commands only
//! show or discard them.

use chrono::{DateTime, Local};
use haven_core::{HavenError, LocalCache};

use crate::app::App;
use crate::output::Output;

pub async fn list(app: &App, out: Output) -> Result<(), HavenError> {
    let pending = app.cache.pending().await?;
    if out.json {
        return out.print_json(&pending);
    }
    if pending.is_empty() {
        println!("No pending writes.");
        return Ok(());
    }
    for m in &pending {
        println!(
            "#{:<4} {}  {:<12} {:<22} user={}",
            m.id,
            local_time(&m.created_at),
            m.resource,
            m.function,
            m.user_id
        );
    }
    println!("{} pending write(s); they are kept until cleared.", pending.len());
    Ok(())
}

/// Render a stored RFC 3339 timestamp in local time, or as-is when it does
/// not parse.
fn local_time(stored: &str) -> String {
    DateTime::parse_from_rfc3339(stored)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| stored.to_string())
}

pub async fn clear(app: &App, out: Output) -> Result<(), HavenError> {
    let removed = app.cache.clear_pending().await?;
    if out.json {
        return out.print_json(&serde_json::json!({"cleared": removed}));
    }
    println!("Cleared {removed} pending write(s).");
    Ok(())
}
