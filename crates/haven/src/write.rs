// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write commands: `log-mood`, `submit-assessment`, `send-message`.

use haven_core::HavenError;
use haven_resources::{AssessmentKind, MoodKind, NewAssessment, NewMessage, NewMoodEntry};

use crate::app::App;
use crate::output::Output;

pub async fn log_mood(
    app: &App,
    user: &str,
    mood: MoodKind,
    intensity: u8,
    note: Option<String>,
    out: Output,
) -> Result<(), HavenError> {
    let entry = NewMoodEntry::new(mood, intensity, note)?;
    let outcome = app.services.moods.log(user, &entry).await?;
    out.print_commit("mood", &outcome)
}

/// With `require_confirmed`, a write that only reached the local queue
/// is reported as an error.
pub async fn submit_assessment(
    app: &App,
    user: &str,
    kind: AssessmentKind,
    answers: Vec<u8>,
    require_confirmed: bool,
    out: Output,
) -> Result<(), HavenError> {
    let assessment = NewAssessment::new(kind, answers)?;
    let outcome = app.services.assessments.submit(user, &assessment).await?;
    if require_confirmed && outcome.is_queued() {
        return outcome.into_confirmed().map(|_| ());
    }
    out.print_commit(
        &format!(
            "{kind} ({}/{}, {})",
            assessment.total_score,
            kind.max_score(),
            kind.severity(assessment.total_score)
        ),
        &outcome,
    )
}

pub async fn send_message(
    app: &App,
    user: &str,
    conversation: String,
    body: String,
    out: Output,
) -> Result<(), HavenError> {
    let message = NewMessage::new(conversation, body)?;
    let outcome = app.services.messages.send(user, &message).await?;
    out.print_commit("message", &outcome)
}
