// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation id generation.

/// Produces collision-free conversation ids.
pub trait IdGenerator: Send + Sync + 'static {
    fn generate_new_id(&self) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate_new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let generator = UuidIdGenerator;
        let ids: HashSet<_> = (0..1000).map(|_| generator.generate_new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
