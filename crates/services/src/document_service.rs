use std::sync::Arc;

use storage::repository::{DocumentRepository, DocumentTemplate, InitOutcome};
use tokio::sync::{Mutex, MutexGuard};
use tracker_core::model::AppData;

use crate::error::DocumentServiceError;

/// Whole-document load and replace, with invariant checks on the way in.
#[derive(Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    writes: Arc<Mutex<()>>,
}

impl DocumentService {
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self {
            documents,
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Create the document on first start if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `DocumentServiceError::Storage` if the store cannot be written.
    pub async fn initialize(
        &self,
        template: &DocumentTemplate,
    ) -> Result<InitOutcome, DocumentServiceError> {
        let _guard = self.writes.lock().await;
        Ok(self.documents.initialize_if_absent(template).await?)
    }

    /// # Errors
    ///
    /// Returns `DocumentServiceError::Storage` if the document is missing or unreadable.
    pub async fn load(&self) -> Result<AppData, DocumentServiceError> {
        Ok(self.documents.load().await?)
    }

    /// Validate and persist a complete document.
    ///
    /// Concurrent callers are not merged: the last replace wins.
    ///
    /// # Errors
    ///
    /// Returns `DocumentServiceError::Validation` if ids are empty or duplicated.
    /// Returns `DocumentServiceError::Storage` if the write fails.
    pub async fn replace(&self, doc: &AppData) -> Result<(), DocumentServiceError> {
        let _guard = self.writes.lock().await;
        self.replace_locked(doc).await
    }

    /// Hold this while doing a load → transform → replace sequence.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub(crate) async fn replace_locked(&self, doc: &AppData) -> Result<(), DocumentServiceError> {
        doc.validate()?;
        self.documents.replace(doc).await?;
        Ok(())
    }
}
