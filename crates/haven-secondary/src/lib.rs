// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secondary tier: a plain request/response client for the REST backend.
//!
//! Every call is a single attempt. Non-2xx statuses, `success: false`
//! envelopes, and transport failures all become [`HavenError::Http`].

pub mod client;
pub mod envelope;

pub use client::RestClient;

use haven_core::HavenError;

/// Build the secondary client from configuration.
///
/// Returns `Ok(None)` when `secondary.base_url` is unset, which disables the tier.
pub fn from_config(
    config: &haven_config::model::SecondaryConfig,
) -> Result<Option<RestClient>, HavenError> {
    let Some(base_url) = &config.base_url else {
        return Ok(None);
    };
    let token = config
        .auth_token
        .as_ref()
        .map(|t| secrecy::SecretString::from(t.clone()));
    RestClient::new(
        base_url.clone(),
        token,
        std::time::Duration::from_millis(config.timeout_ms),
    )
    .map(Some)
}
