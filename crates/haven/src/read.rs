// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read commands: `moods`, `assessments`, `messages`, `settings`.

use serde::Serialize;

use haven_core::HavenError;
use haven_resolver::{LiveResource, Resolution, Snapshot};
use haven_resources::{Assessment, Message, MoodEntry, MoodSummary, UserSettings};

use crate::app::App;
use crate::output::{Output, ReadView};

fn emit<T: Serialize>(
    out: Output,
    resolution: &Resolution<T>,
    render: impl FnOnce(&T),
) -> Result<(), HavenError> {
    if out.json {
        return out.print_json(&ReadView::from(resolution));
    }
    render(&resolution.value);
    out.print_source(resolution.attempt.tier, &resolution.attempt.failures);
    Ok(())
}

pub async fn moods(app: &App, user: &str, days: u32, out: Output) -> Result<(), HavenError> {
    let r = app.services.moods.recent(user, days).await;
    emit(out, &r, |entries| print_moods(days, entries))
}

pub async fn mood_summary(app: &App, user: &str, days: u32, out: Output) -> Result<(), HavenError> {
    let r = app.services.moods.summary(user, days).await;
    emit(out, &r, print_summary)
}

/// Follow the recent window until Ctrl+C.
pub async fn watch_moods(app: &App, user: &str, days: u32, out: Output) -> Result<(), HavenError> {
    let live: LiveResource<Vec<MoodEntry>> = app.services.moods.watch_recent(user, days)?;
    let mut rx = live.subscribe();
    loop {
        let snapshot = rx.borrow_and_update().clone();
        if !snapshot.loading {
            print_snapshot(out, days, &snapshot)?;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => if changed.is_err() { break },
        }
    }
    Ok(())
}

fn print_snapshot(out: Output, days: u32, snapshot: &Snapshot<Vec<MoodEntry>>) -> Result<(), HavenError> {
    if out.json {
        #[derive(Serialize)]
        struct View<'a> {
            data: &'a [MoodEntry],
            tier: Option<haven_core::Tier>,
            error: Option<&'a str>,
        }
        println!(
            "{}",
            serde_json::to_string(&View {
                data: &snapshot.data,
                tier: snapshot.tier,
                error: snapshot.error.as_deref(),
            })?
        );
        return Ok(());
    }
    print_moods(days, &snapshot.data);
    if let Some(tier) = snapshot.tier {
        out.print_source(tier, &[]);
    }
    if let Some(error) = &snapshot.error {
        println!("  error: {error}");
    }
    Ok(())
}

pub async fn assessments(
    app: &App,
    user: &str,
    limit: u32,
    latest: bool,
    out: Output,
) -> Result<(), HavenError> {
    if latest {
        let r = app.services.assessments.latest(user).await;
        return emit(out, &r, |a| match a {
            Some(a) => print_assessments(std::slice::from_ref(a)),
            None => println!("No assessments yet."),
        });
    }
    let r = app.services.assessments.history(user, limit).await;
    emit(out, &r, |list| print_assessments(list))
}

pub async fn messages(
    app: &App,
    user: &str,
    conversation: &str,
    limit: u32,
    out: Output,
) -> Result<(), HavenError> {
    let r = app
        .services
        .messages
        .conversation(user, conversation, limit)
        .await;
    emit(out, &r, |list| print_messages(user, list))
}

pub async fn settings(app: &App, user: &str, out: Output) -> Result<(), HavenError> {
    let r = app.services.settings.get(user).await;
    emit(out, &r, print_settings)
}

fn print_moods(days: u32, entries: &[MoodEntry]) {
    if entries.is_empty() {
        println!("No moods logged in the last {days} days.");
        return;
    }
    for e in entries {
        let note = e.note.as_deref().map(|n| format!("  {n}")).unwrap_or_default();
        println!(
            "{}  {:<8} {:>2}/10{note}",
            e.created_at.format("%Y-%m-%d %H:%M"),
            e.mood.to_string(),
            e.intensity
        );
    }
}

fn print_summary(summary: &MoodSummary) {
    println!("Last {} days: {} entries", summary.days, summary.entries);
    match summary.average_intensity {
        Some(avg) => println!("  average intensity: {avg:.1}/10"),
        None => println!("  average intensity: -"),
    }
    match summary.most_frequent {
        Some(mood) => println!("  most frequent mood: {mood}"),
        None => println!("  most frequent mood: -"),
    }
}

fn print_assessments(list: &[Assessment]) {
    if list.is_empty() {
        println!("No assessments yet.");
        return;
    }
    for a in list {
        println!(
            "{}  {:<5} {:>2}/{}  {}",
            a.created_at.format("%Y-%m-%d"),
            a.kind.to_string(),
            a.total_score,
            a.kind.max_score(),
            a.severity()
        );
    }
}

fn print_messages(user: &str, list: &[Message]) {
    if list.is_empty() {
        println!("No messages.");
        return;
    }
    for m in list {
        let who = if m.sender_id == user { "you" } else { m.sender_id.as_str() };
        println!("[{}] {who}: {}", m.sent_at.format("%m-%d %H:%M"), m.body);
    }
}

fn print_settings(s: &UserSettings) {
    println!("notifications:        {}", if s.notifications_enabled { "on" } else { "off" });
    println!(
        "daily reminder:       {}",
        s.daily_reminder.as_deref().unwrap_or("off")
    );
    println!("theme:                {}", s.theme);
    println!(
        "share with therapist: {}",
        if s.share_with_therapist { "yes" } else { "no" }
    );
}
