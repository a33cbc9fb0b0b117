// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Haven - offline-tolerant data access for the Haven mental-health app.
//!
//! Reads fall back from the live document database to the REST backend to
//! the on-device cache; writes that no backend accepts are kept locally.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod config_cmd;
mod output;
mod pending;
mod read;
mod status;
mod write;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use haven_config::HavenConfig;
use haven_core::HavenError;
use haven_resources::{AssessmentKind, MoodKind};

use crate::app::App;
use crate::output::Output;

/// Haven - offline-tolerant data access.
#[derive(Parser, Debug)]
#[command(name = "haven", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User to act for (defaults to `app.user_id`).
    #[arg(long, short, global = true)]
    user: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show recent moods.
    Moods {
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Print average intensity and most frequent mood instead.
        #[arg(long, conflicts_with = "watch")]
        summary: bool,
        /// Keep printing as the data changes, until Ctrl+C.
        #[arg(long)]
        watch: bool,
    },
    /// Show assessment history.
    Assessments {
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Only the most recent one.
        #[arg(long)]
        latest: bool,
    },
    /// Show a conversation.
    Messages {
        conversation: String,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    /// Show settings.
    Settings,
    /// Record a mood (intensity 1-10).
    LogMood {
        mood: MoodKind,
        intensity: u8,
        #[arg(long)]
        note: Option<String>,
    },
    /// Submit a questionnaire, one score (0-3) per item.
    SubmitAssessment {
        kind: AssessmentKind,
        #[arg(required = true, num_args = 1..)]
        answers: Vec<u8>,
        /// Fail unless a backend confirmed the write.
        #[arg(long)]
        require_confirmed: bool,
    },
    /// Send a message to a conversation.
    SendMessage { conversation: String, body: String },
    /// Inspect or discard writes saved on this device only.
    Pending {
        #[command(subcommand)]
        action: PendingAction,
    },
    /// Check each tier's health.
    Status,
    /// Manage configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum PendingAction {
    /// List queued writes in the order they were made.
    List,
    /// Delete every queued write.
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Validate configuration and report enabled tiers.
    Check,
    /// Print the effective configuration.
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => haven_config::load_and_validate_path(path),
        None => haven_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            haven_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("haven: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: HavenConfig) -> Result<(), HavenError> {
    let out = Output::new(cli.json, cli.plain);

    // Config commands must work without opening the cache.
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Check => config_cmd::check(&config, out),
            ConfigAction::Show => config_cmd::show(&config),
        };
    }

    let app = App::build(config).await?;
    let result = dispatch(&app, cli.user.as_deref(), cli.command, out).await;
    app.shutdown().await?;
    result
}

async fn dispatch(
    app: &App,
    user: Option<&str>,
    command: Commands,
    out: Output,
) -> Result<(), HavenError> {
    match command {
        Commands::Moods {
            days,
            summary,
            watch,
        } => {
            let user = app.user_id(user)?;
            if watch {
                read::watch_moods(app, &user, days, out).await
            } else if summary {
                read::mood_summary(app, &user, days, out).await
            } else {
                read::moods(app, &user, days, out).await
            }
        }
        Commands::Assessments { limit, latest } => {
            read::assessments(app, &app.user_id(user)?, limit, latest, out).await
        }
        Commands::Messages {
            conversation,
            limit,
        } => read::messages(app, &app.user_id(user)?, &conversation, limit, out).await,
        Commands::Settings => read::settings(app, &app.user_id(user)?, out).await,
        Commands::LogMood {
            mood,
            intensity,
            note,
        } => write::log_mood(app, &app.user_id(user)?, mood, intensity, note, out).await,
        Commands::SubmitAssessment {
            kind,
            answers,
            require_confirmed,
        } => {
            let user = app.user_id(user)?;
            write::submit_assessment(app, &user, kind, answers, require_confirmed, out).await
        }
        Commands::SendMessage { conversation, body } => {
            write::send_message(app, &app.user_id(user)?, conversation, body, out).await
        }
        Commands::Pending { action } => match action {
            PendingAction::List => pending::list(app, out).await,
            PendingAction::Clear => pending::clear(app, out).await,
        },
        Commands::Status => status::run(app, out).await,
        Commands::Config { .. } => Ok(()),
    }
}

/// Initializes the tracing subscriber. Logs go to stderr so `--json`
/// output stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("haven={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
