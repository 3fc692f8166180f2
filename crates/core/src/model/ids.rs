use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Clock;

/// Identifier of a tracked building record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

/// Identifier of a workflow step, shared by the config and every record's task map.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

/// Identifier of an observation, unique within its record.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(RecordId);
string_id!(StepId);
string_id!(ObservationId);

impl StepId {
    /// Produce a fresh step id of the form `step_<unix millis>`.
    ///
    /// If that id is already taken (two steps added within the same
    /// millisecond, or a pinned test clock) a random suffix is used instead.
    #[must_use]
    pub fn generate<'a>(clock: &Clock, existing: impl IntoIterator<Item = &'a StepId>) -> Self {
        let candidate = Self(format!("step_{}", clock.now_millis()));
        if existing.into_iter().any(|id| *id == candidate) {
            return Self(format!("step_{}", uuid::Uuid::new_v4().simple()));
        }
        candidate
    }
}

impl ObservationId {
    /// Same scheme as [`StepId::generate`] without the prefix.
    #[must_use]
    pub fn generate<'a>(
        clock: &Clock,
        existing: impl IntoIterator<Item = &'a ObservationId>,
    ) -> Self {
        let candidate = Self(clock.now_millis().to_string());
        if existing.into_iter().any(|id| *id == candidate) {
            return Self(uuid::Uuid::new_v4().simple().to_string());
        }
        candidate
    }
}
