// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tiered resolution for Haven.
//!
//! Reads fall back primary, secondary, local cache, caller default and
//! never fail. Writes fall back primary, secondary, pending queue. Every
//! tier runs under its own deadline, strictly one after the other.

pub mod live;
pub mod observer;
pub mod resolver;
pub mod timeouts;

pub use live::{LiveResource, Snapshot};
pub use observer::{NoopObserver, ResolverObserver, TracingObserver};
pub use resolver::{PrimaryCall, Resolution, Resolver, SecondaryCall};
pub use timeouts::TierTimeouts;
