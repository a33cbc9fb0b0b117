// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the three data tiers.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod cache;
pub mod primary;
pub mod secondary;

pub use adapter::PluginAdapter;
pub use cache::LocalCache;
pub use primary::{PayloadStream, PrimaryService, Subscription};
pub use secondary::SecondaryService;
