// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value conversation backend.
//!
//! Conversations live as JSON values whose lifetime is enforced by the store
//! itself, so no sweeper is needed. [`MemoryKv`] keeps everything in process;
//! with the `redis` feature, [`RedisKv`] talks to a Redis server.

pub mod adapter;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_kv;
pub mod store;

pub use adapter::KeyValueConversationStore;
pub use memory::MemoryKv;
#[cfg(feature = "redis")]
pub use redis_kv::RedisKv;
pub use store::ExpiringKv;
