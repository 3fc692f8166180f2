//! Derived dashboard state.
//!
//! Everything here is a pure function of an [`AppData`] snapshot (or its
//! parts). Nothing is cached: callers recompute after every document change.
//!
//! [`AppData`]: crate::model::AppData

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{Building, Priority, StepDefinition, StepId};

/// Completion status of a record, labelled as in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Non commencé")]
    NotStarted,
    #[serde(rename = "En cours")]
    InProgress,
    #[serde(rename = "Terminé")]
    Done,
}

impl Status {
    /// Display order of the status breakdown chart.
    pub const CHART_ORDER: [Status; 3] = [Status::Done, Status::InProgress, Status::NotStarted];

    /// Classify a percentage: exactly 0 is not started, exactly 100 is done.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            Status::Done
        } else if percent <= 0.0 {
            Status::NotStarted
        } else {
            Status::InProgress
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Status::NotStarted => "Non commencé",
            Status::InProgress => "En cours",
            Status::Done => "Terminé",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    raw: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.raw)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::CHART_ORDER
            .into_iter()
            .find(|st| st.label() == s)
            .ok_or_else(|| ParseStatusError { raw: s.to_owned() })
    }
}

/// Completed vs. active step counts for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub active: usize,
}

impl Progress {
    /// Count the record's active steps and how many of them are completed.
    ///
    /// Only ids present in `steps` are looked at, so task entries for steps
    /// that no longer exist are ignored.
    #[must_use]
    pub fn of(record: &Building, steps: &[StepDefinition]) -> Self {
        let mut progress = Self {
            completed: 0,
            active: 0,
        };
        for step in steps {
            let status = record.step_status(&step.id);
            if status.disabled {
                continue;
            }
            progress.active += 1;
            if status.completed {
                progress.completed += 1;
            }
        }
        progress
    }

    /// Percentage in `[0, 100]`. A record with no active step is complete.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(self) -> f64 {
        if self.active == 0 {
            return 100.0;
        }
        100.0 * self.completed as f64 / self.active as f64
    }

    /// Same classification as [`Status::from_percent`], decided on the counts.
    #[must_use]
    pub fn status(self) -> Status {
        if self.completed == self.active {
            Status::Done
        } else if self.completed == 0 {
            Status::NotStarted
        } else {
            Status::InProgress
        }
    }
}

/// Completion percentage of `record` over its active steps.
#[must_use]
pub fn progress(record: &Building, steps: &[StepDefinition]) -> f64 {
    Progress::of(record, steps).percent()
}

/// Status of `record`.
#[must_use]
pub fn record_status(record: &Building, steps: &[StepDefinition]) -> Status {
    Progress::of(record, steps).status()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl GlobalStats {
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::NotStarted => self.not_started,
            Status::InProgress => self.in_progress,
            Status::Done => self.done,
        }
    }
}

#[must_use]
pub fn global_stats(tasks: &[Building], steps: &[StepDefinition]) -> GlobalStats {
    let mut stats = GlobalStats {
        total: tasks.len(),
        ..GlobalStats::default()
    };
    for record in tasks {
        match record_status(record, steps) {
            Status::NotStarted => stats.not_started += 1,
            Status::InProgress => stats.in_progress += 1,
            Status::Done => stats.done += 1,
        }
    }
    stats
}

/// One slice of the global status chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSlice {
    pub status: Status,
    pub label: String,
    pub count: usize,
}

#[must_use]
pub fn status_breakdown(stats: &GlobalStats) -> Vec<StatusSlice> {
    Status::CHART_ORDER
        .into_iter()
        .map(|status| StatusSlice {
            status,
            label: status.label().to_owned(),
            count: stats.count(status),
        })
        .collect()
}

/// One bar of the per-step chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSeries {
    pub step_id: StepId,
    pub label: String,
    pub completed_count: usize,
    pub remaining_count: usize,
}

/// Per step, completed vs. remaining among records where the step is enabled.
#[must_use]
pub fn per_step_series(tasks: &[Building], steps: &[StepDefinition]) -> Vec<StepSeries> {
    steps
        .iter()
        .map(|step| {
            let mut completed = 0;
            let mut remaining = 0;
            for record in tasks {
                let status = record.step_status(&step.id);
                if status.disabled {
                    continue;
                }
                if status.completed {
                    completed += 1;
                } else {
                    remaining += 1;
                }
            }
            StepSeries {
                step_id: step.id.clone(),
                label: step.label.clone(),
                completed_count: completed,
                remaining_count: remaining,
            }
        })
        .collect()
}

/// Value a filter form sends for "no restriction".
pub const ANY_FILTER_VALUE: &str = "Tous";

/// Read an optional filter value, treating blank and [`ANY_FILTER_VALUE`] as unset.
fn unset_if_blank<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(de)?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | ANY_FILTER_VALUE) => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn blank_query_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(de)?;
    Ok(raw.filter(|q| !q.trim().is_empty()))
}

/// Dashboard filters. Unset fields match everything; set fields are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, rename = "q", deserialize_with = "blank_query_as_none")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "unset_if_blank")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "unset_if_blank")]
    pub status: Option<Status>,
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &Building, steps: &[StepDefinition]) -> bool {
        if let Some(query) = self.query.as_deref() {
            let needle = query.to_lowercase();
            if !record.name.to_lowercase().contains(&needle)
                && !record.service.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != record.priority) {
            return false;
        }
        if self
            .status
            .is_some_and(|s| s != record_status(record, steps))
        {
            return false;
        }
        true
    }
}

/// Records matching `filter`, in document order.
#[must_use]
pub fn filter_records<'a>(
    tasks: &'a [Building],
    steps: &[StepDefinition],
    filter: &RecordFilter,
) -> Vec<&'a Building> {
    tasks
        .iter()
        .filter(|record| filter.matches(record, steps))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepStatus;

    fn steps_ab() -> Vec<StepDefinition> {
        vec![StepDefinition::new("a", "A"), StepDefinition::new("b", "B")]
    }

    fn record(id: &str, name: &str, service: &str, priority: Priority) -> Building {
        Building::new(id, name, service, "RDC", priority)
    }

    fn set(record: &mut Building, step: &str, completed: bool, disabled: bool) {
        record
            .tasks
            .insert(StepId::new(step), StepStatus { completed, disabled });
    }

    #[test]
    fn half_done_is_fifty_percent() {
        let mut r = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut r, "a", true, false);
        set(&mut r, "b", false, false);
        assert!((progress(&r, &steps_ab()) - 50.0).abs() < f64::EPSILON);
        assert_eq!(record_status(&r, &steps_ab()), Status::InProgress);
    }

    #[test]
    fn disabling_the_open_step_completes_the_record() {
        let mut r = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut r, "a", true, false);
        set(&mut r, "b", false, true);
        assert!((progress(&r, &steps_ab()) - 100.0).abs() < f64::EPSILON);
        assert_eq!(record_status(&r, &steps_ab()), Status::Done);
    }

    #[test]
    fn no_active_steps_is_vacuously_done() {
        let r = record("1", "Accueil", "Admin", Priority::Haute);
        assert!((progress(&r, &[]) - 100.0).abs() < f64::EPSILON);
        assert_eq!(record_status(&r, &[]), Status::Done);

        let mut all_disabled = r.clone();
        set(&mut all_disabled, "a", false, true);
        set(&mut all_disabled, "b", true, true);
        assert!((progress(&all_disabled, &steps_ab()) - 100.0).abs() < f64::EPSILON);
        assert_eq!(record_status(&all_disabled, &steps_ab()), Status::Done);
    }

    #[test]
    fn zero_iff_nothing_active_completed() {
        let steps = steps_ab();
        let mut r = record("1", "Accueil", "Admin", Priority::Haute);
        assert_eq!(progress(&r, &steps), 0.0);
        assert_eq!(record_status(&r, &steps), Status::NotStarted);

        // a completed-but-disabled step does not count
        set(&mut r, "a", true, true);
        assert_eq!(progress(&r, &steps), 0.0);

        set(&mut r, "b", true, false);
        assert!((progress(&r, &steps) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn thirds_are_never_misclassified() {
        let steps = vec![
            StepDefinition::new("a", "A"),
            StepDefinition::new("b", "B"),
            StepDefinition::new("c", "C"),
        ];
        let mut r = record("1", "Accueil", "Admin", Priority::Haute);
        for id in ["a", "b", "c"] {
            set(&mut r, id, true, false);
        }
        assert_eq!(record_status(&r, &steps), Status::Done);
        assert_eq!(Status::from_percent(progress(&r, &steps)), Status::Done);
    }

    #[test]
    fn stale_task_keys_are_ignored() {
        let mut r = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut r, "removed", false, false);
        set(&mut r, "a", true, false);
        let steps = vec![StepDefinition::new("a", "A")];
        assert!((progress(&r, &steps) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn status_from_percent_boundaries() {
        assert_eq!(Status::from_percent(0.0), Status::NotStarted);
        assert_eq!(Status::from_percent(0.1), Status::InProgress);
        assert_eq!(Status::from_percent(99.9), Status::InProgress);
        assert_eq!(Status::from_percent(100.0), Status::Done);
    }

    #[test]
    fn global_stats_counts_each_status() {
        let steps = steps_ab();
        let mut done = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut done, "a", true, false);
        set(&mut done, "b", true, false);
        let mut half = record("2", "Studio", "Admin", Priority::Haute);
        set(&mut half, "a", true, false);
        let fresh = record("3", "Morgue", "Morgue", Priority::Basse);

        let stats = global_stats(&[done, half, fresh], &steps);
        assert_eq!(
            stats,
            GlobalStats {
                total: 3,
                done: 1,
                in_progress: 1,
                not_started: 1
            }
        );
        let slices = status_breakdown(&stats);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].label, "Terminé");
        assert_eq!(slices[0].count, 1);
    }

    #[test]
    fn step_series_skips_disabled_records() {
        let steps = steps_ab();
        let mut r1 = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut r1, "a", true, false);
        set(&mut r1, "b", false, true);
        let mut r2 = record("2", "Studio", "Admin", Priority::Haute);
        set(&mut r2, "b", true, false);

        let series = per_step_series(&[r1, r2], &steps);
        assert_eq!(series[0].label, "A");
        assert_eq!((series[0].completed_count, series[0].remaining_count), (1, 1));
        assert_eq!((series[1].completed_count, series[1].remaining_count), (1, 0));
    }

    #[test]
    fn filter_combines_priority_and_status() {
        let steps = steps_ab();
        let mut high_done = record("1", "Accueil", "Admin", Priority::Haute);
        set(&mut high_done, "a", true, false);
        set(&mut high_done, "b", true, false);
        let high_open = record("2", "Studio", "Admin", Priority::Haute);
        let mut low_done = record("3", "Morgue", "Morgue", Priority::Basse);
        set(&mut low_done, "a", true, false);
        set(&mut low_done, "b", true, false);
        let tasks = vec![high_done, high_open, low_done];

        let filter = RecordFilter {
            priority: Some(Priority::Haute),
            status: Some("Terminé".parse().unwrap()),
            ..RecordFilter::default()
        };
        let hits = filter_records(&tasks, &steps, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");
    }

    #[test]
    fn query_matches_name_or_service_case_insensitively() {
        let steps = steps_ab();
        let tasks = vec![
            record("1", "Bâtiment 01", "Chirurgie Tardive", Priority::Moyenne),
            record("2", "Maternité", "Maternité", Priority::Haute),
            record("3", "Dialyse", "Dialyse", Priority::Basse),
        ];
        let filter = RecordFilter {
            query: Some("CHIRURGIE".into()),
            ..RecordFilter::default()
        };
        let hits = filter_records(&tasks, &steps, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "1");

        let filter = RecordFilter {
            query: Some("maternité".into()),
            ..RecordFilter::default()
        };
        assert_eq!(filter_records(&tasks, &steps, &filter).len(), 1);

        assert_eq!(
            filter_records(&tasks, &steps, &RecordFilter::default()).len(),
            3
        );
    }

    #[test]
    fn blank_and_any_filter_values_are_unset() {
        let filter: RecordFilter =
            serde_json::from_str(r#"{"q": " ", "priority": "", "status": "Tous"}"#).unwrap();
        assert_eq!(filter, RecordFilter::default());

        let filter: RecordFilter =
            serde_json::from_str(r#"{"priority": "Haute", "status": "En cours"}"#).unwrap();
        assert_eq!(filter.priority, Some(Priority::Haute));
        assert_eq!(filter.status, Some(Status::InProgress));

        assert!(serde_json::from_str::<RecordFilter>(r#"{"priority": "Urgent"}"#).is_err());
    }
}
