// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`Conversation`] trait implemented by every conversation type, and the
//! static step-field declarations it exposes.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConvoError;
use crate::types::{ConversationHeader, ConversationSpec};

/// A multi-step, short-lived state object persisted between requests.
///
/// Implementors embed a [`ConversationHeader`], declare their identity in
/// [`SPEC`](Conversation::SPEC), and list every data field together with the
/// step that introduces it in [`step_fields`](Conversation::step_fields),
/// usually via [`step_fields!`](crate::step_fields).
///
/// ```
/// use convo_core::{step_fields, Conversation, ConversationHeader, ConversationSpec, StepField};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct Signup {
///     header: ConversationHeader,
///     email: Option<String>,
///     plan: Option<String>,
/// }
///
/// impl Conversation for Signup {
///     const SPEC: ConversationSpec = ConversationSpec::new("Signup").with_version("1");
///
///     fn header(&self) -> &ConversationHeader { &self.header }
///     fn header_mut(&mut self) -> &mut ConversationHeader { &mut self.header }
///     fn step_fields() -> Vec<StepField<Self>> {
///         step_fields!(Signup { email => 1, plan => 2 })
///     }
/// }
///
/// assert_eq!(Signup::step_fields().len(), 2);
/// ```
pub trait Conversation: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Type name, schema version and time-to-live of this conversation type.
    const SPEC: ConversationSpec;

    fn header(&self) -> &ConversationHeader;

    fn header_mut(&mut self) -> &mut ConversationHeader;

    /// Every data field of the type with its step number.
    ///
    /// Return an empty list for types without steps.
    fn step_fields() -> Vec<StepField<Self>>
    where
        Self: Sized;

    /// Convenience accessor for the conversation id.
    fn id(&self) -> Option<&str> {
        self.header().id.as_deref()
    }
}

/// One data field of a conversation type, tagged with its step.
///
/// `read` produces the field's serialized form (used for structural
/// comparison) and `clear` resets it to its empty value. `blank`, when set,
/// produces the serialized form of that empty value, so a field still holding
/// it (`0`, `false`) is not mistaken for user input.
pub struct StepField<T> {
    name: &'static str,
    step: u32,
    read: fn(&T) -> Result<Value, serde_json::Error>,
    clear: fn(&mut T),
    blank: Option<fn(&T) -> Result<Value, serde_json::Error>>,
}

impl<T> StepField<T> {
    pub fn new(
        name: &'static str,
        step: u32,
        read: fn(&T) -> Result<Value, serde_json::Error>,
        clear: fn(&mut T),
    ) -> Self {
        Self {
            name,
            step,
            read,
            clear,
            blank: None,
        }
    }

    /// Set how the cleared value of this field serializes.
    pub fn with_blank(mut self, blank: fn(&T) -> Result<Value, serde_json::Error>) -> Self {
        self.blank = Some(blank);
        self
    }

    /// A field that carries no step tag. Types declaring one fail step validation.
    pub fn untagged(
        name: &'static str,
        read: fn(&T) -> Result<Value, serde_json::Error>,
        clear: fn(&mut T),
    ) -> Self {
        Self::new(name, 0, read, clear)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Step number, or `None` when the field is untagged.
    pub fn step(&self) -> Option<u32> {
        (self.step > 0).then_some(self.step)
    }

    /// Serialized form of this field's current value in `conversation`.
    pub fn read(&self, conversation: &T) -> Result<Value, ConvoError> {
        Ok((self.read)(conversation)?)
    }

    pub fn clear(&self, conversation: &mut T) {
        (self.clear)(conversation)
    }

    /// Serialized form of the value `clear` leaves behind, when declared.
    pub fn blank(&self, conversation: &T) -> Result<Option<Value>, ConvoError> {
        match self.blank {
            Some(blank) => Ok(Some(blank(conversation)?)),
            None => Ok(None),
        }
    }
}

impl<T> Clone for StepField<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StepField<T> {}

impl<T> fmt::Debug for StepField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepField")
            .field("name", &self.name)
            .field("step", &self.step)
            .finish()
    }
}

/// Declare the step fields of a conversation type.
///
/// `step_fields!(Wizard { name => 1, email => 1, address => 2 })` expands to a
/// `Vec<StepField<Wizard>>` reading each field through serde and clearing it
/// to `Default::default()`, which is also declared as the field's blank value.
#[macro_export]
macro_rules! step_fields {
    ($ty:ty { $($field:ident => $step:expr),* $(,)? }) => {
        ::std::vec![$(
            $crate::StepField::<$ty>::new(
                ::core::stringify!($field),
                $step,
                |conversation: &$ty| $crate::__private::serde_json::to_value(&conversation.$field),
                |conversation: &mut $ty| {
                    conversation.$field = ::core::default::Default::default();
                },
            )
            .with_blank(|conversation: &$ty| {
                $crate::__private::serde_json::to_value(
                    &$crate::__private::default_like(&conversation.$field),
                )
            })
        ),*]
    };
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Booking {
        header: ConversationHeader,
        city: Option<String>,
        nights: Option<u32>,
        guests: Vec<String>,
        rooms: u32,
    }

    impl Conversation for Booking {
        const SPEC: ConversationSpec = ConversationSpec::new("Booking");

        fn header(&self) -> &ConversationHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut ConversationHeader {
            &mut self.header
        }

        fn step_fields() -> Vec<StepField<Self>> {
            crate::step_fields!(Booking { city => 1, nights => 1, guests => 2, rooms => 2 })
        }
    }

    #[test]
    fn macro_declares_fields_in_order() {
        let fields = Booking::step_fields();
        let names: Vec<_> = fields.iter().map(|f| (f.name(), f.step())).collect();
        assert_eq!(
            names,
            vec![
                ("city", Some(1)),
                ("nights", Some(1)),
                ("guests", Some(2)),
                ("rooms", Some(2))
            ]
        );
    }

    #[test]
    fn read_and_clear_go_through_the_field() {
        let mut booking = Booking {
            city: Some("Lisbon".into()),
            guests: vec!["ana".into()],
            ..Default::default()
        };
        let fields = Booking::step_fields();

        assert_eq!(fields[0].read(&booking).unwrap(), serde_json::json!("Lisbon"));
        assert_eq!(fields[2].read(&booking).unwrap(), serde_json::json!(["ana"]));

        fields[2].clear(&mut booking);
        assert!(booking.guests.is_empty());
        assert_eq!(booking.city.as_deref(), Some("Lisbon"));
    }

    #[test]
    fn macro_declares_default_as_blank() {
        let booking = Booking {
            rooms: 3,
            ..Default::default()
        };
        let fields = Booking::step_fields();

        assert_eq!(fields[3].read(&booking).unwrap(), serde_json::json!(3));
        assert_eq!(fields[3].blank(&booking).unwrap(), Some(serde_json::json!(0)));
        assert_eq!(fields[1].blank(&booking).unwrap(), Some(Value::Null));
        assert_eq!(fields[2].blank(&booking).unwrap(), Some(serde_json::json!([])));
    }

    #[test]
    fn untagged_field_has_no_step() {
        let field: StepField<Booking> =
            StepField::untagged("city", |b| serde_json::to_value(&b.city), |b| b.city = None);
        assert_eq!(field.step(), None);
        assert_eq!(field.blank(&Booking::default()).unwrap(), None);
    }

    #[test]
    fn id_reads_from_header() {
        let mut booking = Booking::default();
        assert_eq!(booking.id(), None);
        booking.header_mut().id = Some("c-1".into());
        assert_eq!(booking.id(), Some("c-1"));
    }
}
