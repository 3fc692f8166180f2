use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::building::Building;
use crate::model::config::{ConfigError, ProjectConfig};
use crate::model::ids::{ObservationId, RecordId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("record id cannot be empty")]
    EmptyRecordId,

    #[error("duplicate record id: {0}")]
    DuplicateRecordId(RecordId),

    #[error("duplicate observation id {observation} in record {record}")]
    DuplicateObservationId {
        record: RecordId,
        observation: ObservationId,
    },
}

/// The whole persisted document: project config plus every tracked record.
///
/// Always read and written as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppData {
    pub config: ProjectConfig,
    pub tasks: Vec<Building>,
}

impl AppData {
    #[must_use]
    pub fn new(config: ProjectConfig, tasks: Vec<Building>) -> Self {
        Self { config, tasks }
    }

    /// Minimal document written on first start when no template is available.
    #[must_use]
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            config: ProjectConfig::fallback(name),
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn building(&self, id: &RecordId) -> Option<&Building> {
        self.tasks.iter().find(|b| &b.id == id)
    }

    /// Check the id invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, config first, then records in order.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.config.validate()?;

        let mut records = HashSet::with_capacity(self.tasks.len());
        for building in &self.tasks {
            if building.id.as_str().is_empty() {
                return Err(DocumentError::EmptyRecordId);
            }
            if !records.insert(&building.id) {
                return Err(DocumentError::DuplicateRecordId(building.id.clone()));
            }

            let mut notes = HashSet::with_capacity(building.observations.len());
            for obs in &building.observations {
                if !notes.insert(&obs.id) {
                    return Err(DocumentError::DuplicateObservationId {
                        record: building.id.clone(),
                        observation: obs.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
