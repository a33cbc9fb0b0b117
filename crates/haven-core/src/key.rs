// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource addressing shared by remote queries and the local cache.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use crate::error::HavenError;

/// Bytes escaped in each storage-key component. Covers the separators
/// `_ ? & =` and the escape byte itself, so distinct keys never share a row.
const KEY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'%')
    .add(b'_')
    .add(b'?')
    .add(b'&')
    .add(b'=')
    .add(b'#');

fn component(raw: &str) -> impl fmt::Display + '_ {
    utf8_percent_encode(raw, KEY_COMPONENT)
}

/// Identifies one cacheable unit of data: `(user_id, resource, params)`.
///
/// Params live in a `BTreeMap` so equality, hashing, and the serialized
/// storage key never depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    user_id: String,
    resource: String,
    params: BTreeMap<String, String>,
}

impl ResourceKey {
    /// Builds a key with no params.
    ///
    /// Fails with [`HavenError::InvalidKey`] when `user_id` is blank or the
    /// resource name is blank or contains whitespace.
    pub fn new(user_id: impl Into<String>, resource: impl Into<String>) -> Result<Self, HavenError> {
        let user_id = user_id.into();
        let resource = resource.into();

        if user_id.trim().is_empty() {
            return Err(HavenError::InvalidKey(format!(
                "user id must not be empty (resource `{resource}`)"
            )));
        }
        if resource.is_empty() || resource.chars().any(char::is_whitespace) {
            return Err(HavenError::InvalidKey(format!(
                "resource name `{resource}` must be non-empty and contain no whitespace"
            )));
        }

        Ok(Self {
            user_id,
            resource,
            params: BTreeMap::new(),
        })
    }

    /// Adds (or replaces) a variant parameter such as `days` or `limit`.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Looks up a single param value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `{resource}_{user}` prefix shared by every param variant.
    pub fn scope(&self) -> String {
        format!("{}_{}", component(&self.resource), component(&self.user_id))
    }

    /// The string used as the local cache's storage key.
    ///
    /// `moods_u1` without params, `moods_u1?days=7&limit=20` with them.
    /// Separator bytes inside any component are percent-encoded.
    pub fn storage_key(&self) -> String {
        if self.params.is_empty() {
            return self.scope();
        }
        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", component(k), component(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.scope())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
