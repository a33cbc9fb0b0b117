// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Standardized questionnaires (PHQ-9, GAD-7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};

use haven_core::{CommitOutcome, HavenError, ResourceKey};
use haven_resolver::{PrimaryCall, Resolution, Resolver, SecondaryCall};

use crate::{address, pending, rest_path};

const RESOURCE: &str = "assessments";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AssessmentKind {
    /// Patient Health Questionnaire, 9 items scored 0..=3.
    #[serde(alias = "PHQ-9", alias = "phq-9")]
    Phq9,
    /// Generalized Anxiety Disorder scale, 7 items scored 0..=3.
    #[serde(alias = "GAD-7", alias = "gad-7")]
    Gad7,
}

impl AssessmentKind {
    pub fn item_count(self) -> usize {
        match self {
            Self::Phq9 => 9,
            Self::Gad7 => 7,
        }
    }

    pub fn max_score(self) -> u32 {
        self.item_count() as u32 * 3
    }

    /// Standard severity bands for a total score.
    pub fn severity(self, total: u32) -> Severity {
        match (self, total) {
            (_, 0..=4) => Severity::Minimal,
            (_, 5..=9) => Severity::Mild,
            (_, 10..=14) => Severity::Moderate,
            (Self::Phq9, 15..=19) => Severity::ModeratelySevere,
            _ => Severity::Severe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
    Minimal,
    Mild,
    Moderate,
    ModeratelySevere,
    Severe,
}

/// A completed questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "type", alias = "assessment_type", alias = "assessmentType")]
    pub kind: AssessmentKind,
    #[serde(alias = "totalScore", alias = "score")]
    pub total_score: u32,
    #[serde(default, alias = "responses")]
    pub answers: Vec<u8>,
    #[serde(
        alias = "createdAt",
        alias = "completedAt",
        alias = "_creationTime",
        deserialize_with = "crate::timestamp::deserialize"
    )]
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    pub fn severity(&self) -> Severity {
        self.kind.severity(self.total_score)
    }
}

/// A questionnaire about to be submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    #[serde(rename = "type")]
    pub kind: AssessmentKind,
    pub total_score: u32,
    pub answers: Vec<u8>,
}

impl NewAssessment {
    /// Checks item count and item range; the total is computed.
    pub fn new(kind: AssessmentKind, answers: Vec<u8>) -> Result<Self, HavenError> {
        if answers.len() != kind.item_count() {
            return Err(HavenError::Validation(format!(
                "{kind} expects {} answers, got {}",
                kind.item_count(),
                answers.len()
            )));
        }
        if let Some(bad) = answers.iter().find(|a| **a > 3) {
            return Err(HavenError::Validation(format!(
                "answers are scored 0 to 3, got {bad}"
            )));
        }
        let total_score = answers.iter().map(|a| u32::from(*a)).sum();
        Ok(Self {
            kind,
            total_score,
            answers,
        })
    }
}

#[derive(Clone)]
pub struct Assessments {
    resolver: Resolver,
}

impl Assessments {
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Most recent first, at most `limit`. Empty when nothing is reachable.
    pub async fn history(&self, user_id: &str, limit: u32) -> Resolution<Vec<Assessment>> {
        let target = address(user_id, RESOURCE, [("limit", limit.to_string())]);
        target
            .resolve(
                &self.resolver,
                &PrimaryCall::new(
                    "assessments:getHistory",
                    json!({"userId": user_id, "limit": limit}),
                ),
                rest_path(&[RESOURCE, user_id])
                    .map(|path| SecondaryCall::get(format!("{path}?limit={limit}"))),
                Vec::new(),
            )
            .await
    }

    /// The latest assessment, if any.
    pub async fn latest(&self, user_id: &str) -> Resolution<Option<Assessment>> {
        let target = address(user_id, RESOURCE, [("view", "latest".to_string())]);
        target
            .resolve(
                &self.resolver,
                &PrimaryCall::new("assessments:getLatest", json!({"userId": user_id})),
                rest_path(&[RESOURCE, user_id, "latest"]).map(SecondaryCall::get),
                None,
            )
            .await
    }

    /// Submit a questionnaire. A queued outcome means it is saved on this
    /// device only.
    pub async fn submit(
        &self,
        user_id: &str,
        assessment: &NewAssessment,
    ) -> Result<CommitOutcome<Value>, HavenError> {
        let key = ResourceKey::new(user_id, RESOURCE)?;
        let mut body = serde_json::to_value(assessment)?;
        body["userId"] = json!(user_id);

        self.resolver
            .commit(
                &key,
                &PrimaryCall::new("assessments:submit", body.clone()),
                &SecondaryCall::post("/assessments", body.clone()),
                pending(user_id, RESOURCE, "assessments:submit", body),
            )
            .await
    }

    /// Like [`submit`](Self::submit), but a queued write is an error
    /// ([`HavenError::QueuedNotConfirmed`]). For flows that must not
    /// proceed until a backend has the result.
    pub async fn submit_confirmed(
        &self,
        user_id: &str,
        assessment: &NewAssessment,
    ) -> Result<Value, HavenError> {
        self.submit(user_id, assessment).await?.into_confirmed()
    }
}
