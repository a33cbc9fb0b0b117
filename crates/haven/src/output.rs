// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal and JSON rendering shared by the commands.

use std::io::IsTerminal;

use serde::Serialize;

use haven_core::{CommitOutcome, HavenError, Tier, TierFailure};
use haven_resolver::Resolution;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub json: bool,
    pub color: bool,
}

impl Output {
    /// Colors only when not disabled and stdout is a terminal.
    pub fn new(json: bool, plain: bool) -> Self {
        Self {
            json,
            color: !json && !plain && std::io::stdout().is_terminal(),
        }
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<(), HavenError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// The "where did this come from" footer under a read.
    pub fn print_source(&self, tier: Tier, failures: &[TierFailure]) {
        let label = source_label(tier);
        if self.color {
            use colored::Colorize;
            match tier {
                Tier::Primary | Tier::Secondary => println!("  {}", label.green()),
                Tier::Cache => println!("  {}", label.yellow()),
                Tier::Default => println!("  {}", label.red()),
            }
        } else {
            println!("  {label}");
        }
        if tier == Tier::Default
            && let Some(last) = failures.last()
        {
            println!("  last error: {}", last.error);
        }
    }

    pub fn print_commit(&self, what: &str, outcome: &CommitOutcome<serde_json::Value>) -> Result<(), HavenError> {
        if self.json {
            return self.print_json(&CommitView::from(outcome));
        }
        match outcome {
            CommitOutcome::Confirmed { tier, .. } => {
                if self.color {
                    use colored::Colorize;
                    println!("{} {what} saved ({tier})", "✓".green());
                } else {
                    println!("[OK] {what} saved ({tier})");
                }
            }
            CommitOutcome::Queued { pending_id } => {
                if self.color {
                    use colored::Colorize;
                    println!(
                        "{} {what} saved locally, will sync later (pending #{pending_id})",
                        "!".yellow()
                    );
                } else {
                    println!("[QUEUED] {what} saved locally, will sync later (pending #{pending_id})");
                }
            }
        }
        Ok(())
    }
}

pub fn source_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Primary => "source: live (primary)",
        Tier::Secondary => "source: live (secondary)",
        Tier::Cache => "source: offline copy (cache)",
        Tier::Default => "source: nothing reachable (default)",
    }
}

/// JSON shape of a read.
#[derive(Debug, Serialize)]
pub struct ReadView<'a, T: Serialize> {
    pub data: &'a T,
    pub tier: Tier,
    pub cached: bool,
    pub failures: &'a [TierFailure],
    pub elapsed_ms: u64,
}

impl<'a, T: Serialize> From<&'a Resolution<T>> for ReadView<'a, T> {
    fn from(r: &'a Resolution<T>) -> Self {
        Self {
            data: &r.value,
            tier: r.attempt.tier,
            cached: r.attempt.cached,
            failures: &r.attempt.failures,
            elapsed_ms: r.attempt.elapsed.as_millis() as u64,
        }
    }
}

/// JSON shape of a write.
#[derive(Debug, Serialize)]
pub struct CommitView<'a> {
    pub queued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a serde_json::Value>,
}

impl<'a> From<&'a CommitOutcome<serde_json::Value>> for CommitView<'a> {
    fn from(outcome: &'a CommitOutcome<serde_json::Value>) -> Self {
        match outcome {
            CommitOutcome::Confirmed { tier, value } => Self {
                queued: false,
                tier: Some(*tier),
                pending_id: None,
                result: Some(value),
            },
            CommitOutcome::Queued { pending_id } => Self {
                queued: true,
                tier: None,
                pending_id: Some(*pending_id),
                result: None,
            },
        }
    }
}
