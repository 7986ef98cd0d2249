// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relational conversation backend on SQLite.
//!
//! One `conversation_holder` row per `(id, type_name)` with an explicit
//! `expires_at` column. Expired rows are hidden and deleted when read; the
//! [`CleanupSweeper`] removes the ones nobody reads again.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod sweeper;

pub use adapter::SqliteConversationStore;
pub use database::{Database, OpenOptions};
pub use queries::conversations::TableStats;
pub use sweeper::{CleanupSweeper, CleanupTarget};
