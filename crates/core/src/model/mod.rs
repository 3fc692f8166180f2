mod building;
mod config;
mod document;
mod ids;
mod observation;
mod priority;

pub use ids::{ObservationId, RecordId, StepId};

pub use building::{Building, StepStatus};
pub use config::{ConfigError, ProjectConfig, StepDefinition};
pub use document::{AppData, DocumentError};
pub use observation::{Observation, ObservationKind};
pub use priority::{ParsePriorityError, Priority};
