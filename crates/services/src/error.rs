//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use tracker_core::model::DocumentError;
use tracker_core::mutation::MutationError;

/// Errors emitted by `DocumentService` and `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentServiceError {
    #[error(transparent)]
    Validation(#[from] DocumentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TrackingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackingError {
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    Validation(#[from] DocumentError),
    /// The current document could not be read; nothing was written.
    #[error("failed to load document: {0}")]
    Load(StorageError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TrackingError {
    pub(crate) fn from_load(err: DocumentServiceError) -> Self {
        match err {
            DocumentServiceError::Validation(e) => TrackingError::Validation(e),
            DocumentServiceError::Storage(e) => TrackingError::Load(e),
        }
    }
}

impl From<DocumentServiceError> for TrackingError {
    fn from(err: DocumentServiceError) -> Self {
        match err {
            DocumentServiceError::Validation(e) => TrackingError::Validation(e),
            DocumentServiceError::Storage(e) => TrackingError::Storage(e),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Document(#[from] DocumentServiceError),
}
