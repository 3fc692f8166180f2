use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency of a building record. Serialized as the French labels shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Haute,
    Moyenne,
    Basse,
}

impl Priority {
    /// Cycle order used by the priority badge.
    pub const ALL: [Priority; 3] = [Priority::Haute, Priority::Moyenne, Priority::Basse];

    /// Next priority in the cycle Haute → Moyenne → Basse → Haute.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Priority::Haute => Priority::Moyenne,
            Priority::Moyenne => Priority::Basse,
            Priority::Basse => Priority::Haute,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Haute => "Haute",
            Priority::Moyenne => "Moyenne",
            Priority::Basse => "Basse",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError {
    raw: String,
}

impl fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority: {}", self.raw)
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePriorityError { raw: s.to_owned() })
    }
}
