// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all tier adapters must implement.

use async_trait::async_trait;

use crate::error::HavenError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Haven tier adapters.
///
/// Provides identity, lifecycle, and health check capabilities so the
/// composition root can report on every tier uniformly.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the tier role of this adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, HavenError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), HavenError>;
}
