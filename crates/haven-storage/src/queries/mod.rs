// SPDX-FileCopyrightText: 2026 Haven Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the cache tables.

pub mod entries;
pub mod pending;
