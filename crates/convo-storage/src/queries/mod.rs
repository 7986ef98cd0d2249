// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL operations on the `conversation_holder` table.

pub mod conversations;
