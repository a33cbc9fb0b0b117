// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource services for Haven.
//!
//! Each service fixes the primary function references, REST paths, cache
//! keys and defaults for one resource, and decodes payloads into one
//! canonical shape whichever tier produced them.

pub mod assessments;
pub mod messages;
pub mod moods;
pub mod settings;
pub mod timestamp;

pub use assessments::{Assessment, AssessmentKind, Assessments, NewAssessment, Severity};
pub use messages::{Message, Messages, NewMessage};
pub use moods::{MoodEntry, MoodKind, MoodSummary, Moods, NewMoodEntry};
pub use settings::{Settings, Theme, UserSettings};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use haven_core::{HavenError, NewPendingMutation, ResourceKey};
use haven_resolver::{PrimaryCall, Resolution, Resolver, SecondaryCall};

/// Everything but RFC 3986 unreserved characters is escaped. `.` is escaped
/// too; all-dot segments are refused outright in [`rest_path`].
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

/// All resource services sharing one resolver.
#[derive(Clone)]
pub struct Services {
    pub moods: Moods,
    pub assessments: Assessments,
    pub messages: Messages,
    pub settings: Settings,
}

impl Services {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            moods: Moods::new(resolver.clone()),
            assessments: Assessments::new(resolver.clone()),
            messages: Messages::new(resolver.clone()),
            settings: Settings::new(resolver),
        }
    }
}

/// A cache key plus the raw form reported if the key is invalid.
pub(crate) struct Addressed {
    pub key: Result<ResourceKey, HavenError>,
    pub raw: String,
}

impl Addressed {
    /// Resolve through `resolver`, going straight to `default` when either
    /// the key or the REST path is unusable.
    pub async fn resolve<T: DeserializeOwned>(
        self,
        resolver: &Resolver,
        primary: &PrimaryCall,
        secondary: Result<SecondaryCall, HavenError>,
        default: T,
    ) -> Resolution<T> {
        match self.key.and_then(|key| secondary.map(|call| (key, call))) {
            Ok((key, secondary)) => resolver.resolve(&key, primary, &secondary, default).await,
            Err(e) => resolver.resolve_invalid(self.raw, &e, default),
        }
    }
}

/// Join percent-encoded segments into a REST path.
///
/// Empty and all-dot segments are rejected: URL parsing would drop them or
/// resolve them against the parent, even when encoded.
pub(crate) fn rest_path(segments: &[&str]) -> Result<String, HavenError> {
    let mut path = String::new();
    for segment in segments {
        if segment.chars().all(|c| c == '.') {
            return Err(HavenError::InvalidKey(format!(
                "`{segment}` cannot be used as a path segment"
            )));
        }
        path.push('/');
        path.extend(utf8_percent_encode(segment, PATH_SEGMENT));
    }
    Ok(path)
}

pub(crate) fn address<'a>(
    user_id: &str,
    resource: &str,
    params: impl IntoIterator<Item = (&'a str, String)>,
) -> Addressed {
    let key = ResourceKey::new(user_id, resource).map(|key| {
        params
            .into_iter()
            .fold(key, |key, (name, value)| key.with_param(name, value))
    });
    Addressed {
        key,
        raw: format!("{resource}_{user_id}"),
    }
}

pub(crate) fn pending(
    user_id: &str,
    resource: &str,
    function: &str,
    payload: serde_json::Value,
) -> NewPendingMutation {
    NewPendingMutation {
        user_id: user_id.to_string(),
        resource: resource.to_string(),
        function: function.to_string(),
        payload,
    }
}
