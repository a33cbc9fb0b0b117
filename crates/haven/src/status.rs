// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `haven status`: health of each tier.

use std::time::Duration;

use serde::Serialize;

use haven_core::{HavenError, HealthStatus, LocalCache, PluginAdapter, Tier};

use crate::app::App;
use crate::output::Output;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of the status table.
#[derive(Debug, Serialize)]
pub struct TierStatus {
    pub tier: Tier,
    pub adapter: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TierStatus {
    fn disabled(tier: Tier) -> Self {
        Self {
            tier,
            adapter: None,
            state: "disabled".to_string(),
            detail: None,
        }
    }

    fn ok(&self) -> bool {
        self.state == "healthy"
    }
}

async fn check<A: PluginAdapter + ?Sized>(tier: Tier, adapter: &A) -> TierStatus {
    let health = match tokio::time::timeout(CHECK_TIMEOUT, adapter.health_check()).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => HealthStatus::Unhealthy(e.to_string()),
        Err(_) => HealthStatus::Unhealthy(format!("no answer within {CHECK_TIMEOUT:?}")),
    };
    let (state, detail) = match health {
        HealthStatus::Healthy => ("healthy", None),
        HealthStatus::Degraded(d) => ("degraded", Some(d)),
        HealthStatus::Unhealthy(d) => ("unhealthy", Some(d)),
    };
    TierStatus {
        tier,
        adapter: Some(format!("{} {}", adapter.name(), adapter.version())),
        state: state.to_string(),
        detail,
    }
}

pub async fn collect(app: &App) -> Result<(Vec<TierStatus>, usize), HavenError> {
    let mut rows = Vec::with_capacity(3);
    rows.push(match app.resolver.primary() {
        Some(p) => check(Tier::Primary, p.as_ref()).await,
        None => TierStatus::disabled(Tier::Primary),
    });
    rows.push(match app.resolver.secondary() {
        Some(s) => check(Tier::Secondary, s.as_ref()).await,
        None => TierStatus::disabled(Tier::Secondary),
    });
    rows.push(check(Tier::Cache, app.cache.as_ref()).await);

    let pending = app.cache.pending().await.map(|p| p.len()).unwrap_or(0);
    Ok((rows, pending))
}

pub async fn run(app: &App, out: Output) -> Result<(), HavenError> {
    let (rows, pending) = collect(app).await?;

    if out.json {
        return out.print_json(&serde_json::json!({"tiers": rows, "pending": pending}));
    }

    println!();
    println!("  haven status");
    println!("  {}", "-".repeat(35));
    for row in &rows {
        let adapter = row.adapter.as_deref().unwrap_or("-");
        let mark = match (row.ok(), row.state.as_str(), out.color) {
            (true, _, true) => {
                use colored::Colorize;
                "✓".green().to_string()
            }
            (false, "disabled", true) => {
                use colored::Colorize;
                "-".dimmed().to_string()
            }
            (false, _, true) => {
                use colored::Colorize;
                "✗".red().to_string()
            }
            (true, _, false) => "[OK]".to_string(),
            (false, "disabled", false) => "[--]".to_string(),
            (false, _, false) => "[FAIL]".to_string(),
        };
        println!("    {:<10} {mark} {} ({adapter})", row.tier.to_string(), row.state);
        if let Some(detail) = &row.detail {
            println!("               {detail}");
        }
    }
    println!("    pending writes: {pending}");
    println!();
    Ok(())
}
