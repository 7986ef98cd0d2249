// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step invalidation ("nullifier").
//!
//! A save may touch fields of at most one step `k`. Every field of a step
//! after `k` is then cleared, so later progress never outlives an edit to an
//! earlier step.
//!
//! A field counts as updated when its incoming value is non-empty and either
//! nothing is stored yet or the stored value serializes differently. A value
//! equal to the field's declared blank (what clearing leaves behind, e.g. `0`
//! for a plain `u32`) is empty.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use convo_core::{Conversation, ConvoError, StepField};

/// What an invalidation pass decided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// The single step touched by this save, if any.
    pub current_step: Option<u32>,
    /// Fields that were cleared because they belong to later steps.
    pub cleared: Vec<&'static str>,
}

/// `null`, `""`, `[]` and `{}` are treated as "no value".
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Whether `value`, read from `field` of `conversation`, holds no user input.
fn is_unset<T>(
    field: &StepField<T>,
    conversation: &T,
    value: &Value,
) -> Result<bool, ConvoError> {
    if is_empty_value(value) {
        return Ok(true);
    }
    Ok(field.blank(conversation)?.is_some_and(|blank| blank == *value))
}

/// Fields of `incoming` that differ from `stored` under the update rule.
pub fn updated_fields<T>(
    fields: &[StepField<T>],
    incoming: &T,
    stored: Option<&T>,
) -> Result<Vec<StepField<T>>, ConvoError> {
    let mut updated = Vec::new();
    for field in fields {
        let value = field.read(incoming)?;
        if is_unset(field, incoming, &value)? {
            continue;
        }
        let changed = match stored {
            None => true,
            Some(stored) => field.read(stored)? != value,
        };
        if changed {
            updated.push(*field);
        }
    }
    Ok(updated)
}

/// Clear every field of `incoming` whose step comes after the one being
/// submitted.
///
/// Rejects the save with [`ConvoError::MultiStepUpdateRejected`] when fields
/// of more than one step were updated. A save that updates nothing leaves
/// `incoming` untouched.
pub fn invalidate<T: Conversation>(
    fields: &[StepField<T>],
    incoming: &mut T,
    stored: Option<&T>,
) -> Result<Invalidation, ConvoError> {
    let updated = updated_fields(fields, incoming, stored)?;
    let steps: BTreeSet<u32> = updated.iter().filter_map(StepField::step).collect();

    let current = match steps.len() {
        0 => {
            debug!(type_name = T::SPEC.type_name, "no step fields updated");
            return Ok(Invalidation::default());
        }
        1 => steps.first().copied().unwrap_or_default(),
        _ => {
            return Err(ConvoError::MultiStepUpdateRejected {
                type_name: T::SPEC.type_name.to_string(),
                steps: steps.into_iter().collect(),
                fields: updated.iter().map(|f| f.name().to_string()).collect(),
            });
        }
    };

    let mut cleared = Vec::new();
    for field in fields.iter().filter(|f| f.step().is_some_and(|s| s > current)) {
        if is_unset(field, incoming, &field.read(incoming)?)? {
            continue;
        }
        warn!(
            type_name = T::SPEC.type_name,
            id = incoming.id().unwrap_or_default(),
            field = field.name(),
            step = current,
            "clearing field of a later step"
        );
        field.clear(incoming);
        cleared.push(field.name());
    }

    Ok(Invalidation {
        current_step: Some(current),
        cleared,
    })
}
