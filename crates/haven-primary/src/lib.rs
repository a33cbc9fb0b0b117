// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Primary tier: client for the hosted reactive document database.
//!
//! Named server functions (`moods:getRecentMoods`) are invoked over the
//! deployment's JSON function API. Live queries are served by a background
//! watch task per [`Subscription`](haven_core::Subscription).

pub mod client;
pub mod watch;
pub mod wire;

pub use client::DocumentClient;

use std::time::Duration;

use haven_core::HavenError;

/// Build the primary client from configuration.
///
/// Returns `Ok(None)` when `primary.url` is unset, which disables the tier.
pub fn from_config(
    config: &haven_config::model::PrimaryConfig,
) -> Result<Option<DocumentClient>, HavenError> {
    let Some(url) = &config.url else {
        return Ok(None);
    };
    let token = config
        .auth_token
        .as_ref()
        .map(|t| secrecy::SecretString::from(t.clone()));
    DocumentClient::new(
        url.clone(),
        token,
        Duration::from_millis(config.timeout_ms),
        Duration::from_millis(config.subscription_poll_ms),
    )
    .map(Some)
}
