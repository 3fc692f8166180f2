use serde::{Deserialize, Serialize};

use crate::model::ids::ObservationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationKind {
    Text,
    Todo,
}

/// A note or checklist item attached to a building.
///
/// `completed` only means something for [`ObservationKind::Todo`]. On the
/// wire a todo always carries the flag; a plain note omits it unless set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireObservation", into = "WireObservation")]
pub struct Observation {
    pub id: ObservationId,
    pub text: String,
    pub kind: ObservationKind,
    pub completed: bool,
}

impl Observation {
    #[must_use]
    pub fn text(id: ObservationId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            kind: ObservationKind::Text,
            completed: false,
        }
    }

    #[must_use]
    pub fn todo(id: ObservationId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            kind: ObservationKind::Todo,
            completed: false,
        }
    }

    #[must_use]
    pub fn is_todo(&self) -> bool {
        self.kind == ObservationKind::Todo
    }
}

#[derive(Serialize, Deserialize)]
struct WireObservation {
    id: ObservationId,
    text: String,
    #[serde(rename = "type")]
    kind: ObservationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

impl From<WireObservation> for Observation {
    fn from(wire: WireObservation) -> Self {
        Self {
            id: wire.id,
            text: wire.text,
            kind: wire.kind,
            completed: wire.completed.unwrap_or(false),
        }
    }
}

impl From<Observation> for WireObservation {
    fn from(obs: Observation) -> Self {
        let completed = match obs.kind {
            ObservationKind::Todo => Some(obs.completed),
            ObservationKind::Text => obs.completed.then_some(true),
        };
        Self {
            id: obs.id,
            text: obs.text,
            kind: obs.kind,
            completed,
        }
    }
}
