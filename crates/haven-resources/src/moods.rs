// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mood journal.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};
use tracing::warn;

use haven_core::{CommitOutcome, HavenError};
use haven_resolver::{LiveResource, PrimaryCall, Resolution, Resolver, SecondaryCall};

use crate::{address, pending, rest_path};

const RESOURCE: &str = "moods";

/// Mood labels the app offers. Unknown labels from either backend decode
/// as [`MoodKind::Other`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MoodKind {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
    Angry,
    Tired,
    #[serde(other)]
    Other,
}

/// A recorded mood.
///
/// Older backend versions name the label `mood_type`, `moodType` or
/// `type`; all of them land in `mood`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "mood_type", alias = "moodType", alias = "type")]
    pub mood: MoodKind,
    pub intensity: u8,
    #[serde(default, alias = "notes")]
    pub note: Option<String>,
    #[serde(
        alias = "createdAt",
        alias = "_creationTime",
        deserialize_with = "crate::timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,
}

/// A mood about to be logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMoodEntry {
    pub mood: MoodKind,
    pub intensity: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewMoodEntry {
    /// Intensity is on a 1 to 10 scale.
    pub fn new(mood: MoodKind, intensity: u8, note: Option<String>) -> Result<Self, HavenError> {
        if !(1..=10).contains(&intensity) {
            return Err(HavenError::Validation(format!(
                "mood intensity must be between 1 and 10, got {intensity}"
            )));
        }
        Ok(Self {
            mood,
            intensity,
            note: note.filter(|n| !n.trim().is_empty()),
        })
    }
}

/// Aggregate over a window of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    pub days: u32,
    pub entries: usize,
    pub average_intensity: Option<f64>,
    pub most_frequent: Option<MoodKind>,
}

impl MoodSummary {
    pub fn from_entries(days: u32, entries: &[MoodEntry]) -> Self {
        let average_intensity = (!entries.is_empty()).then(|| {
            entries.iter().map(|e| f64::from(e.intensity)).sum::<f64>() / entries.len() as f64
        });

        let mut counts: HashMap<MoodKind, (usize, DateTime<Utc>)> = HashMap::new();
        for entry in entries {
            let slot = counts.entry(entry.mood).or_insert((0, entry.created_at));
            slot.0 += 1;
            slot.1 = slot.1.max(entry.created_at);
        }
        // Ties go to the mood seen most recently.
        let most_frequent = counts
            .into_iter()
            .max_by_key(|(_, (count, latest))| (*count, *latest))
            .map(|(mood, _)| mood);

        Self {
            days,
            entries: entries.len(),
            average_intensity,
            most_frequent,
        }
    }
}

/// Mood reads and writes.
#[derive(Clone)]
pub struct Moods {
    resolver: Resolver,
}

impl Moods {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    fn read_calls(
        user_id: &str,
        days: u32,
    ) -> (PrimaryCall, Result<SecondaryCall, HavenError>) {
        (
            PrimaryCall::new("moods:getRecentMoods", json!({"userId": user_id, "days": days})),
            rest_path(&[RESOURCE, user_id])
                .map(|path| SecondaryCall::get(format!("{path}?days={days}"))),
        )
    }

    /// Entries from the last `days` days. Empty when nothing is reachable.
    pub async fn recent(&self, user_id: &str, days: u32) -> Resolution<Vec<MoodEntry>> {
        let target = address(user_id, RESOURCE, [("days", days.to_string())]);
        let (primary, secondary) = Self::read_calls(user_id, days);
        let resolution: Resolution<Vec<MoodEntry>> = target
            .resolve(&self.resolver, &primary, secondary, Vec::new())
            .await;

        let unrecognized = resolution
            .value
            .iter()
            .filter(|e| e.mood == MoodKind::Other)
            .count();
        if unrecognized > 0 {
            warn!(
                user_id,
                unrecognized,
                tier = %resolution.tier(),
                "mood entries with unrecognized labels shown as `other`"
            );
        }
        resolution
    }

    /// Summary of [`recent`](Self::recent).
    pub async fn summary(&self, user_id: &str, days: u32) -> Resolution<MoodSummary> {
        let Resolution { value, attempt } = self.recent(user_id, days).await;
        Resolution {
            value: MoodSummary::from_entries(days, &value),
            attempt,
        }
    }

    /// Record a mood. Queues locally when neither backend accepts it.
    pub async fn log(
        &self,
        user_id: &str,
        entry: &NewMoodEntry,
    ) -> Result<CommitOutcome<Value>, HavenError> {
        let key = haven_core::ResourceKey::new(user_id, RESOURCE)?;
        let mut body = serde_json::to_value(entry)?;
        body["userId"] = json!(user_id);

        self.resolver
            .commit(
                &key,
                &PrimaryCall::new("moods:logMood", body.clone()),
                &SecondaryCall::post("/moods", body.clone()),
                pending(user_id, RESOURCE, "moods:logMood", body),
            )
            .await
    }

    /// Keep the recent window current for display.
    pub fn watch_recent(
        &self,
        user_id: &str,
        days: u32,
    ) -> Result<LiveResource<Vec<MoodEntry>>, HavenError> {
        let key = haven_core::ResourceKey::new(user_id, RESOURCE)?.with_param("days", days);
        let (primary, secondary) = Self::read_calls(user_id, days);
        Ok(LiveResource::start(
            self.resolver.clone(),
            key,
            primary,
            secondary?,
            Vec::new(),
        ))
    }
}
