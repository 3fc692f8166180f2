use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracker_core::model::AppData;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("document not found")]
    NotFound,

    #[error("invalid document: {0}")]
    Parse(String),

    #[error("i/o error: {0}")]
    Io(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Parse(err.to_string())
    }
}

/// What [`DocumentRepository::initialize_if_absent`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyPresent,
    SeededFromTemplate,
    WroteFallback,
}

/// Where a fresh document comes from on first start.
#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    /// JSON file copied as-is when present and valid.
    pub path: Option<PathBuf>,
    /// Project name of the minimal document used otherwise.
    pub fallback_name: String,
}

impl DocumentTemplate {
    #[must_use]
    pub fn new(path: Option<PathBuf>, fallback_name: impl Into<String>) -> Self {
        Self {
            path,
            fallback_name: fallback_name.into(),
        }
    }

    /// Read and check the template file.
    ///
    /// Returns `None` when no path is configured or the file is missing,
    /// unreadable, or not a valid document.
    pub async fn load(&self) -> Option<AppData> {
        let path = self.path.as_ref()?;
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "template unreadable");
                return None;
            }
        };
        let doc: AppData = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "template is not a valid document");
                return None;
            }
        };
        if let Err(err) = doc.validate() {
            tracing::warn!(path = %path.display(), error = %err, "template violates document invariants");
            return None;
        }
        Some(doc)
    }

    #[must_use]
    pub fn fallback(&self) -> AppData {
        AppData::fallback(self.fallback_name.clone())
    }
}

/// Whole-document persistence.
///
/// There are no partial updates: callers load the document, transform it in
/// memory, and hand the complete result back to [`replace`](Self::replace).
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Read the persisted document.
    ///
    /// # Errors
    ///
    /// `StorageError::NotFound` if nothing has been persisted,
    /// `StorageError::Parse` if the content is not a valid document,
    /// `StorageError::Io` / `StorageError::Connection` for other read failures.
    async fn load(&self) -> Result<AppData, StorageError>;

    /// Overwrite the persisted document in full.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn replace(&self, doc: &AppData) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be queried.
    async fn exists(&self) -> Result<bool, StorageError>;

    /// Create the document on first start. No-op when it already exists.
    ///
    /// A template that cannot be used is logged and replaced by the
    /// minimal fallback rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the existence check or the write fails.
    async fn initialize_if_absent(
        &self,
        template: &DocumentTemplate,
    ) -> Result<InitOutcome, StorageError> {
        if self.exists().await? {
            return Ok(InitOutcome::AlreadyPresent);
        }
        if let Some(doc) = template.load().await {
            self.replace(&doc).await?;
            tracing::info!(records = doc.tasks.len(), "document seeded from template");
            return Ok(InitOutcome::SeededFromTemplate);
        }
        self.replace(&template.fallback()).await?;
        tracing::info!(name = %template.fallback_name, "fallback document written");
        Ok(InitOutcome::WroteFallback)
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    doc: Arc<Mutex<Option<AppData>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(doc: AppData) -> Self {
        Self {
            doc: Arc::new(Mutex::new(Some(doc))),
        }
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn load(&self) -> Result<AppData, StorageError> {
        let guard = self
            .doc
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.clone().ok_or(StorageError::NotFound)
    }

    async fn replace(&self, doc: &AppData) -> Result<(), StorageError> {
        let mut guard = self
            .doc
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(doc.clone());
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        let guard = self
            .doc
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.is_some())
    }
}

/// The document backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub documents: Arc<dyn DocumentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            documents: Arc::new(InMemoryRepository::new()),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            documents: Arc::new(crate::json_file::JsonFileRepository::new(path)),
        }
    }
}
