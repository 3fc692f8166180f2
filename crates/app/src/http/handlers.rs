use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use services::Dashboard;
use tracker_core::model::{
    AppData, Building, Observation, ObservationId, ObservationKind, ProjectConfig, RecordId,
    StepId,
};
use tracker_core::progress::RecordFilter;

use super::{ApiError, ApiJson, ApiQuery, AppState};

type DocumentResponse = Result<Json<AppData>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct StepLabel {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectHeaderBody {
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
}

#[derive(Debug, Deserialize)]
pub struct NewObservation {
    #[serde(rename = "type")]
    pub kind: ObservationKind,
    pub text: String,
}

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn get_data(State(state): State<AppState>) -> DocumentResponse {
    let doc = state
        .documents()
        .load()
        .await
        .map_err(ApiError::read_failure)?;
    Ok(Json(doc))
}

pub async fn post_data(
    State(state): State<AppState>,
    ApiJson(doc): ApiJson<AppData>,
) -> Result<Json<Value>, ApiError> {
    state
        .documents()
        .replace(&doc)
        .await
        .map_err(ApiError::save_failure)?;
    tracing::info!(records = doc.tasks.len(), steps = doc.config.steps.len(), "document saved");
    Ok(Json(json!({ "success": true })))
}

pub async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<RecordFilter>,
) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = state
        .dashboard()
        .dashboard(&filter)
        .await
        .map_err(ApiError::read_failure)?;
    Ok(Json(dashboard))
}

pub async fn toggle_step(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(RecordId, StepId)>,
) -> DocumentResponse {
    let doc = state.tracking().toggle_step_completed(&id, &step_id).await?;
    tracing::info!(record = %id, step = %step_id, "step completion toggled");
    Ok(Json(doc))
}

pub async fn toggle_step_disabled(
    State(state): State<AppState>,
    Path((id, step_id)): Path<(RecordId, StepId)>,
) -> DocumentResponse {
    let doc = state.tracking().toggle_step_disabled(&id, &step_id).await?;
    tracing::info!(record = %id, step = %step_id, "step applicability toggled");
    Ok(Json(doc))
}

pub async fn cycle_priority(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> DocumentResponse {
    Ok(Json(state.tracking().cycle_priority(&id).await?))
}

pub async fn replace_observations(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ApiJson(observations): ApiJson<Vec<Observation>>,
) -> DocumentResponse {
    Ok(Json(
        state
            .tracking()
            .replace_observations(&id, observations)
            .await?,
    ))
}

pub async fn add_observation(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    ApiJson(body): ApiJson<NewObservation>,
) -> DocumentResponse {
    Ok(Json(
        state
            .tracking()
            .add_observation(&id, body.kind, &body.text)
            .await?,
    ))
}

pub async fn toggle_todo(
    State(state): State<AppState>,
    Path((id, observation_id)): Path<(RecordId, ObservationId)>,
) -> DocumentResponse {
    Ok(Json(state.tracking().toggle_todo(&id, &observation_id).await?))
}

pub async fn remove_observation(
    State(state): State<AppState>,
    Path((id, observation_id)): Path<(RecordId, ObservationId)>,
) -> DocumentResponse {
    Ok(Json(
        state
            .tracking()
            .remove_observation(&id, &observation_id)
            .await?,
    ))
}

pub async fn replace_config(
    State(state): State<AppState>,
    ApiJson(config): ApiJson<ProjectConfig>,
) -> DocumentResponse {
    let doc = state.tracking().replace_config(config).await?;
    tracing::info!(steps = doc.config.steps.len(), "config replaced");
    Ok(Json(doc))
}

pub async fn rename_project(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ProjectHeaderBody>,
) -> DocumentResponse {
    Ok(Json(
        state
            .tracking()
            .rename_project(&body.name, &body.subtitle)
            .await?,
    ))
}

pub async fn add_step(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<StepLabel>,
) -> DocumentResponse {
    let (doc, step_id) = state.tracking().add_step(&body.label).await?;
    tracing::info!(step = %step_id, "step added");
    Ok(Json(doc))
}

pub async fn relabel_step(
    State(state): State<AppState>,
    Path(step_id): Path<StepId>,
    ApiJson(body): ApiJson<StepLabel>,
) -> DocumentResponse {
    Ok(Json(
        state.tracking().relabel_step(&step_id, &body.label).await?,
    ))
}

pub async fn remove_step(
    State(state): State<AppState>,
    Path(step_id): Path<StepId>,
) -> DocumentResponse {
    let doc = state.tracking().remove_step(&step_id).await?;
    tracing::info!(step = %step_id, "step removed");
    Ok(Json(doc))
}

pub async fn add_building(
    State(state): State<AppState>,
    ApiJson(building): ApiJson<Building>,
) -> DocumentResponse {
    Ok(Json(state.tracking().add_building(building).await?))
}

pub async fn remove_building(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> DocumentResponse {
    Ok(Json(state.tracking().remove_building(&id).await?))
}
