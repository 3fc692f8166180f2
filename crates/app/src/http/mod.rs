//! HTTP surface: the document endpoints plus per-record edit actions.
//!
//! Action routes follow the `/{resource}/@{verb}` shape; every edit answers
//! with the complete document as persisted.

mod handlers;

use axum::{
    Json, Router,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use services::{AppServices, DocumentServiceError, TrackingError};
use tracker_core::mutation::MutationError;

/// Shared application state.
pub type AppState = AppServices;

/// Build the tracker router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/data", get(handlers::get_data).post(handlers::post_data))
        .route("/dashboard", get(handlers::dashboard))
        .route("/project", put(handlers::rename_project))
        .route("/config", put(handlers::replace_config))
        .route("/config/steps", post(handlers::add_step))
        .route(
            "/config/steps/{step_id}",
            put(handlers::relabel_step).delete(handlers::remove_step),
        )
        .route("/buildings", post(handlers::add_building))
        .route("/buildings/{id}", delete(handlers::remove_building))
        .route("/buildings/{id}/@cycle-priority", post(handlers::cycle_priority))
        .route(
            "/buildings/{id}/steps/{step_id}/@toggle",
            post(handlers::toggle_step),
        )
        .route(
            "/buildings/{id}/steps/{step_id}/@toggle-disabled",
            post(handlers::toggle_step_disabled),
        )
        .route(
            "/buildings/{id}/observations",
            put(handlers::replace_observations).post(handlers::add_observation),
        )
        .route(
            "/buildings/{id}/observations/{observation_id}",
            delete(handlers::remove_observation),
        )
        .route(
            "/buildings/{id}/observations/{observation_id}/@toggle",
            post(handlers::toggle_todo),
        )
}

/// JSON body extractor whose rejections answer with the `{"error": ...}` payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections answer with the `{"error": ...}` payload.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Error answered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Any failure to produce the document is reported as a server error.
    pub fn read_failure(err: DocumentServiceError) -> Self {
        tracing::error!(error = %err, "failed to read document");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read data")
    }

    /// Invariant violations are the caller's fault; storage failures are ours.
    pub fn save_failure(err: DocumentServiceError) -> Self {
        match err {
            DocumentServiceError::Validation(err) => {
                tracing::warn!(error = %err, "rejected invalid document");
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            err => {
                tracing::error!(error = %err, "failed to save document");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save data")
            }
        }
    }
}

impl From<TrackingError> for ApiError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::Mutation(err) => {
                let status = match err {
                    MutationError::RecordNotFound(_)
                    | MutationError::StepNotFound(_)
                    | MutationError::ObservationNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_REQUEST,
                };
                tracing::warn!(error = %err, status = status.as_u16(), "edit rejected");
                Self::new(status, err.to_string())
            }
            TrackingError::Validation(err) => {
                tracing::warn!(error = %err, "edit would break document invariants");
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            TrackingError::Load(err) => {
                tracing::error!(error = %err, "failed to read document before edit");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read data")
            }
            err => {
                tracing::error!(error = %err, "failed to apply edit");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save data")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!(error = %rejection, "rejected request body");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!(error = %rejection, "rejected query string");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
