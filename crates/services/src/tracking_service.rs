use std::sync::Arc;

use tracker_core::Clock;
use tracker_core::model::{
    AppData, Building, Observation, ObservationId, ObservationKind, ProjectConfig, RecordId,
    StepId,
};
use tracker_core::mutation::{self, MutationError};

use crate::document_service::DocumentService;
use crate::error::TrackingError;

/// Record and config edits as load → pure transform → replace.
///
/// Every method returns the document as persisted. Edits made through this
/// service are serialized with each other and with `DocumentService::replace`.
#[derive(Clone)]
pub struct TrackingService {
    clock: Clock,
    documents: Arc<DocumentService>,
}

impl TrackingService {
    #[must_use]
    pub fn new(clock: Clock, documents: Arc<DocumentService>) -> Self {
        Self { clock, documents }
    }

    async fn apply<F>(&self, edit: F) -> Result<AppData, TrackingError>
    where
        F: FnOnce(&AppData) -> Result<AppData, MutationError>,
    {
        let (doc, ()) = self
            .apply_with(|current| edit(current).map(|next| (next, ())))
            .await?;
        Ok(doc)
    }

    async fn apply_with<T, F>(&self, edit: F) -> Result<(AppData, T), TrackingError>
    where
        F: FnOnce(&AppData) -> Result<(AppData, T), MutationError>,
    {
        let _guard = self.documents.lock_writes().await;
        let current = self
            .documents
            .load()
            .await
            .map_err(TrackingError::from_load)?;
        let (next, extra) = edit(&current)?;
        self.documents.replace_locked(&next).await?;
        Ok((next, extra))
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record, `TrackingError::Storage` on I/O.
    pub async fn toggle_step_completed(
        &self,
        record: &RecordId,
        step: &StepId,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::toggle_step_completed(doc, record, step))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record, `TrackingError::Storage` on I/O.
    pub async fn toggle_step_disabled(
        &self,
        record: &RecordId,
        step: &StepId,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::toggle_step_disabled(doc, record, step))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record, `TrackingError::Storage` on I/O.
    pub async fn cycle_priority(&self, record: &RecordId) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::cycle_priority(doc, record)).await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record, `TrackingError::Validation`
    /// for duplicate observation ids, `TrackingError::Storage` on I/O.
    pub async fn replace_observations(
        &self,
        record: &RecordId,
        observations: Vec<Observation>,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::replace_observations(doc, record, observations))
            .await
    }

    /// Append a note or todo with a fresh id.
    ///
    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record or blank text.
    pub async fn add_observation(
        &self,
        record: &RecordId,
        kind: ObservationKind,
        text: &str,
    ) -> Result<AppData, TrackingError> {
        let clock = self.clock;
        self.apply(|doc| {
            let existing = doc
                .building(record)
                .map(|b| b.observations.iter().map(|o| &o.id).collect::<Vec<_>>())
                .unwrap_or_default();
            let id = ObservationId::generate(&clock, existing);
            mutation::add_observation(doc, record, id, kind, text)
        })
        .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record or observation, or a plain note.
    pub async fn toggle_todo(
        &self,
        record: &RecordId,
        observation: &ObservationId,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::toggle_todo(doc, record, observation))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record or observation.
    pub async fn remove_observation(
        &self,
        record: &RecordId,
        observation: &ObservationId,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::remove_observation(doc, record, observation))
            .await
    }

    /// Replace the config; task entries of dropped steps are pruned.
    ///
    /// # Errors
    ///
    /// `TrackingError::Validation` for duplicate step ids, `TrackingError::Storage` on I/O.
    pub async fn replace_config(&self, config: ProjectConfig) -> Result<AppData, TrackingError> {
        self.apply(|doc| Ok(mutation::replace_config(doc, config)))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Storage` on I/O.
    pub async fn rename_project(
        &self,
        name: &str,
        subtitle: &str,
    ) -> Result<AppData, TrackingError> {
        self.apply(|doc| Ok(mutation::rename_project(doc, name, subtitle)))
            .await
    }

    /// Append a step with a generated id, returning the new document and that id.
    ///
    /// # Errors
    ///
    /// `TrackingError::Storage` on I/O.
    pub async fn add_step(&self, label: &str) -> Result<(AppData, StepId), TrackingError> {
        let clock = self.clock;
        self.apply_with(|doc| {
            let id = StepId::generate(&clock, doc.config.step_ids());
            mutation::add_step(doc, id.clone(), label).map(|next| (next, id))
        })
        .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown step.
    pub async fn relabel_step(&self, step: &StepId, label: &str) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::relabel_step(doc, step, label))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown step.
    pub async fn remove_step(&self, step: &StepId) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::remove_step(doc, step)).await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` if the id is taken.
    pub async fn add_building(&self, building: Building) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::add_building(doc, building))
            .await
    }

    /// # Errors
    ///
    /// `TrackingError::Mutation` for an unknown record.
    pub async fn remove_building(&self, record: &RecordId) -> Result<AppData, TrackingError> {
        self.apply(|doc| mutation::remove_building(doc, record))
            .await
    }
}
