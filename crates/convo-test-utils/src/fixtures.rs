// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sample conversation types.

use serde::{Deserialize, Serialize};

use convo_core::{step_fields, Conversation, ConversationHeader, ConversationSpec, StepField};

macro_rules! header_accessors {
    () => {
        fn header(&self) -> &ConversationHeader {
            &self.header
        }

        fn header_mut(&mut self) -> &mut ConversationHeader {
            &mut self.header
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
}

/// Three-step sign-up wizard, schema version `1`.
///
/// Step 1: `name`, `email`. Step 2: `address`, `phone`. Step 3: `accepted_terms`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub header: ConversationHeader,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<PostalAddress>,
    pub phone: Option<String>,
    pub accepted_terms: Option<bool>,
}

impl Conversation for Registration {
    const SPEC: ConversationSpec = ConversationSpec::new("Registration").with_version("1");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(Registration {
            name => 1,
            email => 1,
            address => 2,
            phone => 2,
            accepted_terms => 3,
        })
    }
}

impl Registration {
    pub fn step_one(name: &str, email: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            ..Self::default()
        }
    }
}

/// Single-step conversation that lives one second.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickNote {
    #[serde(default)]
    pub header: ConversationHeader,
    pub text: Option<String>,
}

impl Conversation for QuickNote {
    const SPEC: ConversationSpec = ConversationSpec::new("QuickNote").with_time_to_live("PT1S");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(QuickNote { text => 1 })
    }
}

/// Conversation without steps; no invalidation applies. No schema version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub header: ConversationHeader,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

impl Conversation for Feedback {
    const SPEC: ConversationSpec = ConversationSpec::new("Feedback");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        Vec::new()
    }
}

/// Two-step type with schema version `v2` (matched case-insensitively).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub header: ConversationHeader,
    pub product: Option<String>,
    pub quantity: Option<u32>,
}

impl Conversation for Quote {
    const SPEC: ConversationSpec = ConversationSpec::new("Quote").with_version("v2");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(Quote { product => 1, quantity => 2 })
    }
}

/// Malformed: steps 1 and 3, no step 2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GappySurvey {
    #[serde(default)]
    pub header: ConversationHeader,
    pub first: Option<String>,
    pub third: Option<String>,
}

impl Conversation for GappySurvey {
    const SPEC: ConversationSpec = ConversationSpec::new("GappySurvey");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(GappySurvey { first => 1, third => 3 })
    }
}

/// Malformed: steps begin at 2.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateStartSurvey {
    #[serde(default)]
    pub header: ConversationHeader,
    pub second: Option<String>,
}

impl Conversation for LateStartSurvey {
    const SPEC: ConversationSpec = ConversationSpec::new("LateStartSurvey");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(LateStartSurvey { second => 2 })
    }
}

/// Malformed: `notes` carries no step number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UntaggedSurvey {
    #[serde(default)]
    pub header: ConversationHeader,
    pub answer: Option<String>,
    pub notes: Option<String>,
}

impl Conversation for UntaggedSurvey {
    const SPEC: ConversationSpec = ConversationSpec::new("UntaggedSurvey");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        let mut fields = step_fields!(UntaggedSurvey { answer => 1 });
        fields.push(StepField::untagged(
            "notes",
            |s: &UntaggedSurvey| serde_json::to_value(&s.notes),
            |s: &mut UntaggedSurvey| s.notes = None,
        ));
        fields
    }
}

/// Malformed: unparseable time-to-live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BadTtl {
    #[serde(default)]
    pub header: ConversationHeader,
    pub value: Option<String>,
}

impl Conversation for BadTtl {
    const SPEC: ConversationSpec = ConversationSpec::new("BadTtl").with_time_to_live("30 minutes");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(BadTtl { value => 1 })
    }
}

/// Malformed: time-to-live past the accepted maximum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Eternal {
    #[serde(default)]
    pub header: ConversationHeader,
    pub value: Option<String>,
}

impl Conversation for Eternal {
    const SPEC: ConversationSpec =
        ConversationSpec::new("Eternal").with_time_to_live("P100000000D");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(Eternal { value => 1 })
    }
}

/// Two-step basket whose second step holds plain scalars.
///
/// Step 1: `sku`. Step 2: `quantity`, `gift_wrap`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    #[serde(default)]
    pub header: ConversationHeader,
    pub sku: Option<String>,
    pub quantity: u32,
    pub gift_wrap: bool,
}

impl Conversation for Basket {
    const SPEC: ConversationSpec = ConversationSpec::new("Basket");

    header_accessors!();

    fn step_fields() -> Vec<StepField<Self>> {
        step_fields!(Basket { sku => 1, quantity => 2, gift_wrap => 2 })
    }
}
