use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::StepId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("step id cannot be empty")]
    EmptyStepId,

    #[error("duplicate step id: {0}")]
    DuplicateStepId(StepId),
}

/// One stage of the project-wide workflow (e.g. cabling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: StepId,
    pub label: String,
}

impl StepDefinition {
    #[must_use]
    pub fn new(id: impl Into<StepId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Project header plus the ordered step list. Step order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub subtitle: String,
    pub steps: Vec<StepDefinition>,
}

impl ProjectConfig {
    /// Config used when neither a persisted document nor a template exists.
    #[must_use]
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subtitle: String::new(),
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn has_step(&self, id: &StepId) -> bool {
        self.step(id).is_some()
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &StepId> {
        self.steps.iter().map(|s| &s.id)
    }

    /// Check that every step id is non-empty and unique.
    ///
    /// # Errors
    ///
    /// Returns the first offending id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if step.id.as_str().is_empty() {
                return Err(ConfigError::EmptyStepId);
            }
            if !seen.insert(&step.id) {
                return Err(ConfigError::DuplicateStepId(step.id.clone()));
            }
        }
        Ok(())
    }
}
