// SPDX-FileCopyrightText: 2026 Convo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the engine and the storage backends.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ConvoError;
use crate::ttl::parse_iso8601_duration;

/// Bookkeeping carried by every conversation type.
///
/// Concrete conversation types embed one of these and expose it through
/// [`Conversation::header`](crate::Conversation::header).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHeader {
    /// Conversation id, assigned on first save and never changed afterwards.
    #[serde(default)]
    pub id: Option<String>,

    /// String form of the owner that last saved the conversation.
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Schema version stamped when the conversation was created.
    #[serde(default)]
    pub version: Option<String>,

    /// Moment after which the conversation is treated as absent.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// The caller on whose behalf a conversation is read or written.
///
/// Owners are compared by their string form, so `Owner::from(42_i64)` and
/// `Owner::from("42")` are the same owner. [`Owner::ANONYMOUS`] skips
/// ownership checks entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Owner(Option<String>);

impl Owner {
    /// No owner. Reads and deletes with this owner are not ownership-checked.
    pub const ANONYMOUS: Owner = Owner(None);

    /// Create an owner from anything with a string form.
    pub fn new(id: impl ToString) -> Self {
        Self(Some(id.to_string()))
    }

    /// The normalized owner id, if any.
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }

    /// Whether this caller may access a conversation stored for `stored`.
    pub fn permits(&self, stored: Option<&str>) -> bool {
        match self.id() {
            None => true,
            Some(mine) => stored == Some(mine),
        }
    }

    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

macro_rules! owner_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Owner {
                fn from(id: $ty) -> Self {
                    Owner::new(id)
                }
            }
        )*
    };
}

owner_from_display!(&str, String, &String, i32, i64, u32, u64, usize, uuid::Uuid);

impl<T: Into<Owner>> From<Option<T>> for Owner {
    fn from(id: Option<T>) -> Self {
        id.map(Into::into).unwrap_or_default()
    }
}

/// Per-type declaration of identity, schema version and time-to-live.
///
/// Declared as an associated constant of each conversation type:
///
/// ```
/// use convo_core::ConversationSpec;
///
/// const SPEC: ConversationSpec = ConversationSpec::new("CheckoutWizard")
///     .with_version("2")
///     .with_time_to_live("PT10M");
/// assert_eq!(SPEC.version, Some("2"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationSpec {
    /// Name used to scope stored records; two types may share ids.
    pub type_name: &'static str,
    /// Schema version; `None` disables version enforcement.
    pub version: Option<&'static str>,
    /// ISO-8601 duration, e.g. `PT30M`.
    pub time_to_live: &'static str,
}

impl ConversationSpec {
    pub const DEFAULT_TIME_TO_LIVE: &'static str = "PT30M";

    /// Longest accepted time-to-live (36 500 days).
    pub const MAX_TIME_TO_LIVE: Duration = Duration::from_secs(100 * 365 * 86_400);

    pub const fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            version: None,
            time_to_live: Self::DEFAULT_TIME_TO_LIVE,
        }
    }

    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = Some(version);
        self
    }

    pub const fn with_time_to_live(mut self, time_to_live: &'static str) -> Self {
        self.time_to_live = time_to_live;
        self
    }

    /// Parse the declared time-to-live.
    pub fn parse_time_to_live(&self) -> Result<Duration, ConvoError> {
        let ttl = parse_iso8601_duration(self.time_to_live).map_err(|reason| {
            ConvoError::Config(format!(
                "invalid time-to-live `{}` for `{}`: {reason}",
                self.time_to_live, self.type_name
            ))
        })?;
        if ttl.is_zero() {
            return Err(ConvoError::Config(format!(
                "time-to-live for `{}` must be greater than zero",
                self.type_name
            )));
        }
        if ttl > Self::MAX_TIME_TO_LIVE {
            return Err(ConvoError::Config(format!(
                "time-to-live `{}` for `{}` exceeds the {}-day maximum",
                self.time_to_live,
                self.type_name,
                Self::MAX_TIME_TO_LIVE.as_secs() / 86_400
            )));
        }
        Ok(ttl)
    }
}

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// The persistence strategy a backend implements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Native per-key expiry; no sweeper.
    KeyValue,
    /// Explicit expiry column plus periodic sweep.
    Relational,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owners_compare_by_string_form() {
        assert_eq!(Owner::from(1234_i64), Owner::from("1234"));
        assert_eq!(Owner::from(7_u32), Owner::from("7".to_string()));
        assert_ne!(Owner::from("alice"), Owner::from("bob"));
    }

    #[test]
    fn anonymous_owner_permits_everything() {
        assert!(Owner::ANONYMOUS.permits(Some("alice")));
        assert!(Owner::ANONYMOUS.permits(None));
        assert!(Owner::from(None::<&str>).is_anonymous());
    }

    #[test]
    fn named_owner_requires_exact_match() {
        let alice = Owner::from("alice");
        assert!(alice.permits(Some("alice")));
        assert!(!alice.permits(Some("bob")));
        assert!(!alice.permits(None));
    }

    #[test]
    fn spec_defaults_to_thirty_minutes() {
        const SPEC: ConversationSpec = ConversationSpec::new("Plain");
        assert_eq!(SPEC.version, None);
        assert_eq!(
            SPEC.parse_time_to_live().unwrap(),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn spec_rejects_bad_time_to_live() {
        let spec = ConversationSpec::new("Broken").with_time_to_live("thirty minutes");
        assert!(matches!(
            spec.parse_time_to_live(),
            Err(ConvoError::Config(msg)) if msg.contains("Broken")
        ));

        let zero = ConversationSpec::new("Zero").with_time_to_live("PT0S");
        assert!(zero.parse_time_to_live().is_err());
    }

    #[test]
    fn spec_rejects_time_to_live_beyond_maximum() {
        let eternal = ConversationSpec::new("Eternal").with_time_to_live("P100000000D");
        assert!(matches!(
            eternal.parse_time_to_live(),
            Err(ConvoError::Config(msg)) if msg.contains("Eternal") && msg.contains("maximum")
        ));

        let long = ConversationSpec::new("Long").with_time_to_live("P36500D");
        assert_eq!(
            long.parse_time_to_live().unwrap(),
            ConversationSpec::MAX_TIME_TO_LIVE
        );
    }

    #[test]
    fn backend_kind_display_round_trips() {
        use std::str::FromStr;

        for kind in [BackendKind::KeyValue, BackendKind::Relational] {
            let parsed = BackendKind::from_str(&kind.to_string()).expect("should parse back");
            assert_eq!(kind, parsed);
        }
        assert_eq!(BackendKind::KeyValue.to_string(), "key_value");
    }
}
