use std::sync::Arc;

use serde::Serialize;
use tracker_core::model::{AppData, Building, Priority, RecordId};
use tracker_core::progress::{
    GlobalStats, Progress, RecordFilter, Status, StatusSlice, StepSeries, global_stats,
    per_step_series, status_breakdown,
};

use crate::document_service::DocumentService;
use crate::error::DocumentServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectHeader {
    pub name: String,
    pub subtitle: String,
}

/// One row of the records table, with its derived progress.
///
/// Presentation-agnostic: the percentage is left unrounded and labels are
/// the raw status values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    pub id: RecordId,
    pub name: String,
    pub service: String,
    pub level: String,
    pub priority: Priority,
    pub percent: f64,
    pub status: Status,
    pub completed_steps: usize,
    pub active_steps: usize,
    pub open_todos: usize,
}

impl RecordRow {
    #[must_use]
    pub fn from_record(record: &Building, progress: Progress) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            service: record.service.clone(),
            level: record.level.clone(),
            priority: record.priority,
            percent: progress.percent(),
            status: progress.status(),
            completed_steps: progress.completed,
            active_steps: progress.active,
            open_todos: record
                .observations
                .iter()
                .filter(|o| o.is_todo() && !o.completed)
                .count(),
        }
    }
}

/// Everything the dashboard shows, derived from one snapshot.
///
/// Header, stats and charts cover every record; only `rows` is filtered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub project: ProjectHeader,
    pub stats: GlobalStats,
    pub status_breakdown: Vec<StatusSlice>,
    pub step_series: Vec<StepSeries>,
    pub rows: Vec<RecordRow>,
}

impl Dashboard {
    #[must_use]
    pub fn build(doc: &AppData, filter: &RecordFilter) -> Self {
        let steps = &doc.config.steps;
        let stats = global_stats(&doc.tasks, steps);
        let rows = doc
            .tasks
            .iter()
            .filter(|record| filter.matches(record, steps))
            .map(|record| RecordRow::from_record(record, Progress::of(record, steps)))
            .collect();

        Self {
            project: ProjectHeader {
                name: doc.config.name.clone(),
                subtitle: doc.config.subtitle.clone(),
            },
            status_breakdown: status_breakdown(&stats),
            step_series: per_step_series(&doc.tasks, steps),
            stats,
            rows,
        }
    }
}

/// Loads the current document and derives the dashboard from it.
#[derive(Clone)]
pub struct DashboardService {
    documents: Arc<DocumentService>,
}

impl DashboardService {
    #[must_use]
    pub fn new(documents: Arc<DocumentService>) -> Self {
        Self { documents }
    }

    /// # Errors
    ///
    /// Returns `DocumentServiceError::Storage` if the document cannot be loaded.
    pub async fn dashboard(&self, filter: &RecordFilter) -> Result<Dashboard, DocumentServiceError> {
        let doc = self.documents.load().await?;
        Ok(Dashboard::build(&doc, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::model::{Observation, ObservationId, StepId};
    use tracker_core::mutation::{replace_observations, toggle_step_completed};
    use tracker_core::template::sample_document;

    fn progressed() -> AppData {
        let mut doc = sample_document();
        for step in ["cabling", "sockets", "wifi", "connection", "test"] {
            doc = toggle_step_completed(&doc, &RecordId::new("1"), &StepId::new(step)).unwrap();
        }
        doc = toggle_step_completed(&doc, &RecordId::new("2"), &StepId::new("cabling")).unwrap();
        replace_observations(
            &doc,
            &RecordId::new("2"),
            vec![
                Observation::todo(ObservationId::new("a"), "open"),
                Observation::text(ObservationId::new("b"), "note"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn stats_cover_all_records_rows_follow_filter() {
        let doc = progressed();
        let filter = RecordFilter {
            status: Some(Status::InProgress),
            ..RecordFilter::default()
        };
        let dash = Dashboard::build(&doc, &filter);

        assert_eq!(dash.stats.total, 36);
        assert_eq!(dash.stats.done, 1);
        assert_eq!(dash.stats.in_progress, 1);
        assert_eq!(dash.stats.not_started, 34);

        assert_eq!(dash.rows.len(), 1);
        let row = &dash.rows[0];
        assert_eq!(row.id, RecordId::new("2"));
        assert!((row.percent - 20.0).abs() < 1e-9);
        assert_eq!((row.completed_steps, row.active_steps), (1, 5));
        assert_eq!(row.open_todos, 1);
    }

    #[test]
    fn step_series_follow_config_order() {
        let dash = Dashboard::build(&progressed(), &RecordFilter::default());
        let labels: Vec<&str> = dash.step_series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Câblage", "Prises", "WiFi", "Racc.", "Tests"]);
        assert_eq!(dash.step_series[0].completed_count, 2);
        assert_eq!(dash.step_series[0].remaining_count, 34);
        assert_eq!(dash.rows.len(), 36);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let dash = Dashboard::build(&progressed(), &RecordFilter::default());
        let value = serde_json::to_value(&dash).unwrap();
        assert!(value["stats"]["inProgress"].is_number());
        assert!(value["stepSeries"][0]["completedCount"].is_number());
        assert_eq!(value["statusBreakdown"][0]["label"], "Terminé");
        assert_eq!(value["rows"][0]["status"], "Terminé");
    }
}
