// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for convo integration tests.
//!
//! - [`fixtures`]: sample conversation types, well-formed and malformed.
//! - [`SequenceIdGenerator`]: predictable ids.
//! - [`TestBackends`]: a temp-file SQLite store or an in-process key-value
//!   store, with hooks for tampering with stored rows.

pub mod fixtures;
pub mod harness;
pub mod ids;

pub use harness::TestBackends;
pub use ids::SequenceIdGenerator;
