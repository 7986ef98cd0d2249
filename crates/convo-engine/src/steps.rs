// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Step metadata validation.
//!
//! A conversation type's step numbers, deduplicated and sorted, must be
//! exactly `1..=n`. Several fields may share a step. Types without any step
//! fields are exempt.

use std::collections::{BTreeSet, HashSet};

use convo_core::{Conversation, ConvoError, StepField};

/// Validated step layout of a conversation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepLayout {
    /// Number of distinct steps (0 for step-less types).
    pub steps: u32,
    pub fields: usize,
}

impl StepLayout {
    pub fn is_exempt(&self) -> bool {
        self.fields == 0
    }
}

/// Validate the step fields declared by `T`.
pub fn validate_steps<T: Conversation>() -> Result<StepLayout, ConvoError> {
    validate_step_fields(T::SPEC.type_name, &T::step_fields())
}

pub fn validate_step_fields<T>(
    type_name: &str,
    fields: &[StepField<T>],
) -> Result<StepLayout, ConvoError> {
    let invalid = |reason: String| ConvoError::InvalidStepConfiguration {
        type_name: type_name.to_string(),
        reason,
    };

    if fields.is_empty() {
        return Ok(StepLayout {
            steps: 0,
            fields: 0,
        });
    }

    let mut names = HashSet::with_capacity(fields.len());
    let mut steps = BTreeSet::new();
    for field in fields {
        let step = field
            .step()
            .ok_or_else(|| invalid(format!("field `{}` has no step number", field.name())))?;
        if !names.insert(field.name()) {
            return Err(invalid(format!("field `{}` is declared twice", field.name())));
        }
        steps.insert(step);
    }

    // Non-empty: every field contributed a step.
    let first = steps.first().copied().unwrap_or_default();
    let last = steps.last().copied().unwrap_or_default();

    if first != 1 {
        return Err(invalid(format!("steps must start at 1, found {first}")));
    }
    if last as usize != steps.len() {
        let missing: Vec<u32> = (1..=last).filter(|s| !steps.contains(s)).collect();
        return Err(invalid(format!("step numbers have gaps, missing {missing:?}")));
    }

    Ok(StepLayout {
        steps: last,
        fields: fields.len(),
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::Value;

    use super::*;

    struct Dummy;

    fn read(_: &Dummy) -> Result<Value, serde_json::Error> {
        Ok(Value::Null)
    }

    fn clear(_: &mut Dummy) {}

    const NAMES: [&str; 12] = [
        "f0", "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11",
    ];

    fn fields(steps: &[u32]) -> Vec<StepField<Dummy>> {
        steps
            .iter()
            .enumerate()
            .map(|(i, &s)| StepField::new(NAMES[i], s, read, clear))
            .collect()
    }

    fn reason(result: Result<StepLayout, ConvoError>) -> String {
        match result {
            Err(ConvoError::InvalidStepConfiguration { reason, .. }) => reason,
            other => panic!("expected InvalidStepConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn accepts_shared_steps() {
        let layout = validate_step_fields("T", &fields(&[1, 1, 2, 3, 3])).unwrap();
        assert_eq!(layout.steps, 3);
        assert_eq!(layout.fields, 5);
    }

    #[test]
    fn step_less_type_is_exempt() {
        let layout = validate_step_fields::<Dummy>("T", &[]).unwrap();
        assert!(layout.is_exempt());
    }

    #[test]
    fn rejects_not_starting_at_one() {
        assert!(reason(validate_step_fields("T", &fields(&[2, 3]))).contains("start at 1"));
    }

    #[test]
    fn rejects_gaps() {
        let r = reason(validate_step_fields("T", &fields(&[1, 2, 4])));
        assert!(r.contains("gaps"));
        assert!(r.contains("[3]"));
    }

    #[test]
    fn rejects_untagged_field() {
        let mut f = fields(&[1, 2]);
        f.push(StepField::untagged("loose", read, clear));
        assert!(reason(validate_step_fields("T", &f)).contains("`loose`"));
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let f = vec![
            StepField::new("a", 1, read, clear),
            StepField::new("a", 2, read, clear),
        ];
        assert!(reason(validate_step_fields("T", &f)).contains("declared twice"));
    }

    proptest! {
        #[test]
        fn contiguous_steps_in_any_order_are_valid(
            n in 1u32..6,
            extra in proptest::collection::vec(1u32..6, 0..6),
            seed in any::<u64>(),
        ) {
            let mut steps: Vec<u32> = (1..=n).collect();
            steps.extend(extra.into_iter().map(|s| (s - 1) % n + 1));
            let len = steps.len();
            let rotate = (seed as usize) % len;
            steps.rotate_left(rotate);

            let layout = validate_step_fields("T", &fields(&steps)).unwrap();
            prop_assert_eq!(layout.steps, n);
        }

        #[test]
        fn any_gap_is_rejected(n in 2u32..8, hole in 1u32..8) {
            prop_assume!(hole < n);
            let steps: Vec<u32> = (1..=n).filter(|s| *s != hole).collect();
            prop_assert!(validate_step_fields("T", &fields(&steps)).is_err());
        }
    }
}
