// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamps as either tier sends them.
//!
//! The document database reports creation times as epoch milliseconds
//! (possibly fractional); the REST backend sends RFC 3339 strings. Both
//! decode to `DateTime<Utc>`; serialization is always RFC 3339.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Millis(f64),
    Text(String),
}

fn from_raw<E: serde::de::Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
    match raw {
        Raw::Millis(ms) => Utc
            .timestamp_millis_opt(ms as i64)
            .single()
            .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
        Raw::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("invalid timestamp {text:?}: {e}"))),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    from_raw(Raw::deserialize(deserializer)?)
}

pub mod option {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<Raw>::deserialize(deserializer)?
            .map(from_raw)
            .transpose()
    }
}
