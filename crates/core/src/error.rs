use thiserror::Error;

use crate::model::{ConfigError, DocumentError};
use crate::mutation::MutationError;

/// Umbrella error for callers that do not care which core check failed.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}
