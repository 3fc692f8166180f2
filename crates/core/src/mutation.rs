//! Snapshot transforms.
//!
//! Every function takes the current document by reference and returns a new
//! one; the input is never modified. Persisting the result is the caller's job.

use std::collections::HashSet;
use thiserror::Error;

use crate::model::{
    AppData, Building, Observation, ObservationId, ObservationKind, ProjectConfig, RecordId,
    StepDefinition, StepId, StepStatus,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MutationError {
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("record already exists: {0}")]
    DuplicateRecord(RecordId),

    #[error("step not found: {0}")]
    StepNotFound(StepId),

    #[error("step already exists: {0}")]
    DuplicateStep(StepId),

    #[error("observation not found: {0}")]
    ObservationNotFound(ObservationId),

    #[error("observation {0} is not a todo item")]
    NotATodo(ObservationId),

    #[error("observation text cannot be empty")]
    EmptyObservation,
}

/// Copy `doc`, replacing the record `id` with `edit(record)`.
fn with_record<F>(doc: &AppData, id: &RecordId, edit: F) -> Result<AppData, MutationError>
where
    F: FnOnce(&Building) -> Result<Building, MutationError>,
{
    let index = doc
        .tasks
        .iter()
        .position(|b| &b.id == id)
        .ok_or_else(|| MutationError::RecordNotFound(id.clone()))?;
    let updated = edit(&doc.tasks[index])?;

    let mut tasks = doc.tasks.clone();
    tasks[index] = updated;
    Ok(AppData {
        config: doc.config.clone(),
        tasks,
    })
}

fn with_step_status<F>(
    doc: &AppData,
    record: &RecordId,
    step: &StepId,
    edit: F,
) -> Result<AppData, MutationError>
where
    F: FnOnce(StepStatus) -> StepStatus,
{
    with_record(doc, record, |b| {
        let mut next = b.clone();
        let status = edit(b.step_status(step));
        // an absent key already reads as the default status
        if status == StepStatus::default() {
            next.tasks.remove(step);
        } else {
            next.tasks.insert(step.clone(), status);
        }
        Ok(next)
    })
}

/// Flip the completed checkbox of `step` for `record`.
///
/// # Errors
///
/// `RecordNotFound` if no record has that id.
pub fn toggle_step_completed(
    doc: &AppData,
    record: &RecordId,
    step: &StepId,
) -> Result<AppData, MutationError> {
    with_step_status(doc, record, step, |s| StepStatus {
        completed: !s.completed,
        ..s
    })
}

/// Flip whether `step` applies to `record` at all.
///
/// # Errors
///
/// `RecordNotFound` if no record has that id.
pub fn toggle_step_disabled(
    doc: &AppData,
    record: &RecordId,
    step: &StepId,
) -> Result<AppData, MutationError> {
    with_step_status(doc, record, step, |s| StepStatus {
        disabled: !s.disabled,
        ..s
    })
}

/// # Errors
///
/// `RecordNotFound` if no record has that id.
pub fn cycle_priority(doc: &AppData, record: &RecordId) -> Result<AppData, MutationError> {
    with_record(doc, record, |b| {
        let mut next = b.clone();
        next.priority = b.priority.next();
        Ok(next)
    })
}

/// Swap the observation list of `record` wholesale.
///
/// # Errors
///
/// `RecordNotFound` if no record has that id.
pub fn replace_observations(
    doc: &AppData,
    record: &RecordId,
    observations: Vec<Observation>,
) -> Result<AppData, MutationError> {
    with_record(doc, record, |b| {
        let mut next = b.clone();
        next.observations = observations;
        Ok(next)
    })
}

/// Append a note or todo. Blank text is rejected.
///
/// # Errors
///
/// `RecordNotFound`, or `EmptyObservation` when `text` is blank.
pub fn add_observation(
    doc: &AppData,
    record: &RecordId,
    id: ObservationId,
    kind: ObservationKind,
    text: &str,
) -> Result<AppData, MutationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MutationError::EmptyObservation);
    }
    with_record(doc, record, |b| {
        let mut next = b.clone();
        next.observations.push(match kind {
            ObservationKind::Text => Observation::text(id, text),
            ObservationKind::Todo => Observation::todo(id, text),
        });
        Ok(next)
    })
}

/// # Errors
///
/// `RecordNotFound`, `ObservationNotFound`, or `NotATodo` for a plain note.
pub fn toggle_todo(
    doc: &AppData,
    record: &RecordId,
    observation: &ObservationId,
) -> Result<AppData, MutationError> {
    with_record(doc, record, |b| {
        let mut next = b.clone();
        let obs = next
            .observations
            .iter_mut()
            .find(|o| &o.id == observation)
            .ok_or_else(|| MutationError::ObservationNotFound(observation.clone()))?;
        if !obs.is_todo() {
            return Err(MutationError::NotATodo(observation.clone()));
        }
        obs.completed = !obs.completed;
        Ok(next)
    })
}

/// # Errors
///
/// `RecordNotFound` or `ObservationNotFound`.
pub fn remove_observation(
    doc: &AppData,
    record: &RecordId,
    observation: &ObservationId,
) -> Result<AppData, MutationError> {
    with_record(doc, record, |b| {
        if !b.observations.iter().any(|o| &o.id == observation) {
            return Err(MutationError::ObservationNotFound(observation.clone()));
        }
        let mut next = b.clone();
        next.observations.retain(|o| &o.id != observation);
        Ok(next)
    })
}

/// Swap the project config wholesale.
///
/// Steps present in the old config but missing from the new one are also
/// dropped from every record's task map. Keys the old config never listed
/// are left alone.
#[must_use]
pub fn replace_config(doc: &AppData, config: ProjectConfig) -> AppData {
    let removed: HashSet<StepId> = {
        let kept: HashSet<&StepId> = config.step_ids().collect();
        doc.config
            .step_ids()
            .filter(|id| !kept.contains(id))
            .cloned()
            .collect()
    };

    let tasks = doc
        .tasks
        .iter()
        .map(|b| {
            let mut next = b.clone();
            if !removed.is_empty() {
                next.tasks.retain(|id, _| !removed.contains(id));
            }
            next
        })
        .collect();

    AppData { config, tasks }
}

#[must_use]
pub fn rename_project(doc: &AppData, name: &str, subtitle: &str) -> AppData {
    let mut config = doc.config.clone();
    config.name = name.to_owned();
    config.subtitle = subtitle.to_owned();
    AppData {
        config,
        tasks: doc.tasks.clone(),
    }
}

/// Append a step at the end of the workflow.
///
/// # Errors
///
/// `DuplicateStep` if `id` is already used.
pub fn add_step(doc: &AppData, id: StepId, label: &str) -> Result<AppData, MutationError> {
    if doc.config.has_step(&id) {
        return Err(MutationError::DuplicateStep(id));
    }
    let mut config = doc.config.clone();
    config.steps.push(StepDefinition::new(id, label));
    Ok(AppData {
        config,
        tasks: doc.tasks.clone(),
    })
}

/// # Errors
///
/// `StepNotFound` if no step has that id.
pub fn relabel_step(doc: &AppData, id: &StepId, label: &str) -> Result<AppData, MutationError> {
    let mut config = doc.config.clone();
    let step = config
        .steps
        .iter_mut()
        .find(|s| &s.id == id)
        .ok_or_else(|| MutationError::StepNotFound(id.clone()))?;
    step.label = label.to_owned();
    Ok(AppData {
        config,
        tasks: doc.tasks.clone(),
    })
}

/// Remove a step from the workflow and from every record's task map.
///
/// # Errors
///
/// `StepNotFound` if no step has that id.
pub fn remove_step(doc: &AppData, id: &StepId) -> Result<AppData, MutationError> {
    if !doc.config.has_step(id) {
        return Err(MutationError::StepNotFound(id.clone()));
    }
    let mut config = doc.config.clone();
    config.steps.retain(|s| &s.id != id);
    Ok(replace_config(doc, config))
}

/// # Errors
///
/// `DuplicateRecord` if a record with the same id exists.
pub fn add_building(doc: &AppData, building: Building) -> Result<AppData, MutationError> {
    if doc.building(&building.id).is_some() {
        return Err(MutationError::DuplicateRecord(building.id));
    }
    let mut tasks = doc.tasks.clone();
    tasks.push(building);
    Ok(AppData {
        config: doc.config.clone(),
        tasks,
    })
}

/// # Errors
///
/// `RecordNotFound` if no record has that id.
pub fn remove_building(doc: &AppData, id: &RecordId) -> Result<AppData, MutationError> {
    if doc.building(id).is_none() {
        return Err(MutationError::RecordNotFound(id.clone()));
    }
    let tasks = doc.tasks.iter().filter(|b| &b.id != id).cloned().collect();
    Ok(AppData {
        config: doc.config.clone(),
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use crate::progress::{Status, progress, record_status};

    fn doc() -> AppData {
        AppData::new(
            ProjectConfig {
                name: "Suivi".into(),
                subtitle: "Hôpital".into(),
                steps: vec![StepDefinition::new("a", "A"), StepDefinition::new("b", "B")],
            },
            vec![
                Building::new("1", "Accueil", "Admin", "RDC", Priority::Haute),
                Building::new("2", "Morgue", "Morgue", "R+1", Priority::Basse),
            ],
        )
    }

    fn rid(id: &str) -> RecordId {
        RecordId::new(id)
    }

    fn sid(id: &str) -> StepId {
        StepId::new(id)
    }

    #[test]
    fn toggle_completed_leaves_input_untouched() {
        let before = doc();
        let after = toggle_step_completed(&before, &rid("1"), &sid("a")).unwrap();
        assert!(after.tasks[0].is_step_completed(&sid("a")));
        assert!(!before.tasks[0].is_step_completed(&sid("a")));
        assert!(before.tasks[0].tasks.is_empty());
        assert_eq!(after.tasks[1], before.tasks[1]);
    }

    #[test]
    fn toggling_twice_restores_status() {
        let start = doc();
        assert!(start.tasks[0].tasks.is_empty());
        let once = toggle_step_completed(&start, &rid("1"), &sid("a")).unwrap();
        assert!(once.tasks[0].is_step_completed(&sid("a")));
        let twice = toggle_step_completed(&once, &rid("1"), &sid("a")).unwrap();
        assert_eq!(twice, start);
    }

    #[test]
    fn explicit_default_entry_reads_the_same_after_two_toggles() {
        let mut start = doc();
        start.tasks[0].tasks.insert(sid("a"), StepStatus::default());
        let once = toggle_step_disabled(&start, &rid("1"), &sid("a")).unwrap();
        let twice = toggle_step_disabled(&once, &rid("1"), &sid("a")).unwrap();
        assert_eq!(
            twice.tasks[0].step_status(&sid("a")),
            start.tasks[0].step_status(&sid("a"))
        );
        assert!(!twice.tasks[0].tasks.contains_key(&sid("a")));
    }

    #[test]
    fn toggle_disabled_keeps_completed_flag() {
        let d = toggle_step_completed(&doc(), &rid("1"), &sid("b")).unwrap();
        let d = toggle_step_disabled(&d, &rid("1"), &sid("b")).unwrap();
        let status = d.tasks[0].step_status(&sid("b"));
        assert!(status.completed);
        assert!(status.disabled);
    }

    #[test]
    fn unknown_record_is_an_error() {
        let err = toggle_step_completed(&doc(), &rid("99"), &sid("a")).unwrap_err();
        assert_eq!(err, MutationError::RecordNotFound(rid("99")));
        assert!(cycle_priority(&doc(), &rid("99")).is_err());
    }

    #[test]
    fn priority_cycles_through_all_three() {
        let d1 = cycle_priority(&doc(), &rid("1")).unwrap();
        assert_eq!(d1.tasks[0].priority, Priority::Moyenne);
        let d2 = cycle_priority(&d1, &rid("1")).unwrap();
        assert_eq!(d2.tasks[0].priority, Priority::Basse);
        let d3 = cycle_priority(&d2, &rid("1")).unwrap();
        assert_eq!(d3.tasks[0].priority, Priority::Haute);
    }

    #[test]
    fn observations_add_toggle_remove() {
        let d = add_observation(
            &doc(),
            &rid("1"),
            ObservationId::new("n1"),
            ObservationKind::Todo,
            "  tirer le câble  ",
        )
        .unwrap();
        assert_eq!(d.tasks[0].observations[0].text, "tirer le câble");
        assert!(!d.tasks[0].observations[0].completed);

        let d = toggle_todo(&d, &rid("1"), &ObservationId::new("n1")).unwrap();
        assert!(d.tasks[0].observations[0].completed);

        let d = remove_observation(&d, &rid("1"), &ObservationId::new("n1")).unwrap();
        assert!(d.tasks[0].observations.is_empty());
    }

    #[test]
    fn blank_observation_is_rejected() {
        let err = add_observation(
            &doc(),
            &rid("1"),
            ObservationId::new("n1"),
            ObservationKind::Text,
            "   ",
        )
        .unwrap_err();
        assert_eq!(err, MutationError::EmptyObservation);
    }

    #[test]
    fn toggling_a_text_note_is_rejected() {
        let d = add_observation(
            &doc(),
            &rid("1"),
            ObservationId::new("n1"),
            ObservationKind::Text,
            "RAS",
        )
        .unwrap();
        let err = toggle_todo(&d, &rid("1"), &ObservationId::new("n1")).unwrap_err();
        assert_eq!(err, MutationError::NotATodo(ObservationId::new("n1")));
    }

    #[test]
    fn replace_observations_swaps_the_list() {
        let notes = vec![
            Observation::text(ObservationId::new("x"), "a"),
            Observation::todo(ObservationId::new("y"), "b"),
        ];
        let d = replace_observations(&doc(), &rid("2"), notes.clone()).unwrap();
        assert_eq!(d.tasks[1].observations, notes);
        assert!(d.tasks[0].observations.is_empty());
    }

    #[test]
    fn add_step_appends_at_the_end() {
        let d = add_step(&doc(), sid("step_1"), "Nouvelle Étape").unwrap();
        assert_eq!(d.config.steps.len(), 3);
        assert_eq!(d.config.steps[2].id, sid("step_1"));
        assert_eq!(
            add_step(&d, sid("a"), "dup").unwrap_err(),
            MutationError::DuplicateStep(sid("a"))
        );
    }

    #[test]
    fn relabel_step_keeps_order() {
        let d = relabel_step(&doc(), &sid("b"), "Prises").unwrap();
        assert_eq!(d.config.steps[1].label, "Prises");
        assert_eq!(d.config.steps[1].id, sid("b"));
        assert!(relabel_step(&doc(), &sid("zz"), "x").is_err());
    }

    #[test]
    fn removing_a_step_prunes_task_keys() {
        let d = toggle_step_completed(&doc(), &rid("1"), &sid("a")).unwrap();
        let d = toggle_step_completed(&d, &rid("1"), &sid("b")).unwrap();
        let d = remove_step(&d, &sid("b")).unwrap();
        assert_eq!(d.config.steps.len(), 1);
        assert!(!d.tasks[0].tasks.contains_key(&sid("b")));
        assert!(d.tasks[0].tasks.contains_key(&sid("a")));
    }

    #[test]
    fn replace_config_leaves_unknown_keys_alone() {
        let mut start = doc();
        start.tasks[0].tasks.insert(sid("legacy"), StepStatus::default());
        let mut config = start.config.clone();
        config.steps.retain(|s| s.id != sid("a"));
        let d = replace_config(&start, config);
        assert!(d.tasks[0].tasks.contains_key(&sid("legacy")));
        // progress ignores the stale key
        let steps = &d.config.steps;
        assert_eq!(progress(&d.tasks[0], steps), 0.0);
        assert_eq!(record_status(&d.tasks[0], steps), Status::NotStarted);
    }

    #[test]
    fn rename_project_changes_header_only() {
        let d = rename_project(&doc(), "Chantier B", "Annexe");
        assert_eq!(d.config.name, "Chantier B");
        assert_eq!(d.config.subtitle, "Annexe");
        assert_eq!(d.config.steps, doc().config.steps);
        assert_eq!(d.tasks, doc().tasks);
    }

    #[test]
    fn add_and_remove_buildings() {
        let b = Building::new("3", "Dialyse", "Dialyse", "RDC", Priority::Basse);
        let d = add_building(&doc(), b.clone()).unwrap();
        assert_eq!(d.tasks.len(), 3);
        assert_eq!(
            add_building(&d, b).unwrap_err(),
            MutationError::DuplicateRecord(rid("3"))
        );
        let d = remove_building(&d, &rid("1")).unwrap();
        assert_eq!(d.tasks.len(), 2);
        assert!(d.building(&rid("1")).is_none());
        assert!(remove_building(&d, &rid("1")).is_err());
    }
}
