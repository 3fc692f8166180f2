use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{RecordId, StepId};
use crate::model::observation::Observation;
use crate::model::priority::Priority;

/// Per-record state of one workflow step.
///
/// A missing entry in [`Building::tasks`] is equivalent to `StepStatus::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// One tracked location (building, wing, floor) and its step progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: RecordId,
    pub name: String,
    pub service: String,
    pub level: String,
    pub priority: Priority,
    #[serde(default)]
    pub tasks: BTreeMap<StepId, StepStatus>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Building {
    #[must_use]
    pub fn new(
        id: impl Into<RecordId>,
        name: impl Into<String>,
        service: impl Into<String>,
        level: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            service: service.into(),
            level: level.into(),
            priority,
            tasks: BTreeMap::new(),
            observations: Vec::new(),
        }
    }

    /// Status for `step`, defaulting to not completed / not disabled.
    #[must_use]
    pub fn step_status(&self, step: &StepId) -> StepStatus {
        self.tasks.get(step).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_step_active(&self, step: &StepId) -> bool {
        !self.step_status(step).disabled
    }

    #[must_use]
    pub fn is_step_completed(&self, step: &StepId) -> bool {
        self.step_status(step).completed
    }
}
