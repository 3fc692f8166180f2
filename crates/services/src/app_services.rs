use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::{DocumentTemplate, InitOutcome, Storage};

use crate::Clock;
use crate::dashboard::DashboardService;
use crate::document_service::DocumentService;
use crate::error::AppServicesError;
use crate::tracking_service::TrackingService;

/// Assembles app-facing services over one document store.
#[derive(Clone)]
pub struct AppServices {
    init_outcome: InitOutcome,
    documents: Arc<DocumentService>,
    tracking: Arc<TrackingService>,
    dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or document seeding fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        template: &DocumentTemplate,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::bootstrap(storage, clock, template).await
    }

    /// Build services backed by a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the document cannot be seeded.
    pub async fn new_json_file(
        path: impl Into<PathBuf>,
        clock: Clock,
        template: &DocumentTemplate,
    ) -> Result<Self, AppServicesError> {
        Self::bootstrap(Storage::json_file(path), clock, template).await
    }

    /// Wire the services over `storage`, creating the document if it is absent.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Document` if the first write fails.
    pub async fn bootstrap(
        storage: Storage,
        clock: Clock,
        template: &DocumentTemplate,
    ) -> Result<Self, AppServicesError> {
        let documents = Arc::new(DocumentService::new(Arc::clone(&storage.documents)));
        let init_outcome = documents.initialize(template).await?;
        tracing::info!(outcome = ?init_outcome, "document store ready");

        let tracking = Arc::new(TrackingService::new(clock, Arc::clone(&documents)));
        let dashboard = Arc::new(DashboardService::new(Arc::clone(&documents)));

        Ok(Self {
            init_outcome,
            documents,
            tracking,
            dashboard,
        })
    }

    #[must_use]
    pub fn init_outcome(&self) -> InitOutcome {
        self.init_outcome
    }

    #[must_use]
    pub fn documents(&self) -> Arc<DocumentService> {
        Arc::clone(&self.documents)
    }

    #[must_use]
    pub fn tracking(&self) -> Arc<TrackingService> {
        Arc::clone(&self.tracking)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }
}
