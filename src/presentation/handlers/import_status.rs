use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ImportJob, ImportJobId};
use crate::presentation::handlers::import::IMPORT_STATUS_PATH;
use crate::presentation::handlers::problem::{ProblemDetail, ProblemType, import_error_problem};
use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportStatusResponse {
    pub import_id: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<ImportJob> for ImportStatusResponse {
    fn from(job: ImportJob) -> Self {
        Self {
            import_id: job.id.to_string(),
            status: job.status.as_str().to_string(),
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

#[tracing::instrument(skip(state))]
pub async fn import_status_handler(
    State(state): State<AppState>,
    Path(import_id): Path<String>,
) -> Response {
    let instance = format!("{}/{}", IMPORT_STATUS_PATH, import_id);

    // Ids are UUIDs; anything else cannot name an import.
    let Ok(id) = import_id.parse::<ImportJobId>() else {
        return ProblemDetail::new(
            ProblemType::ResourceNotFound,
            format!("Import not found with id: {}", import_id),
            instance,
        )
        .into_response();
    };

    match state.import_service.import_status(id).await {
        Ok(job) => (StatusCode::OK, Json(ImportStatusResponse::from(job))).into_response(),
        Err(e) => {
            import_error_problem(&e, &instance, state.settings.import.retry_after_seconds)
                .into_response()
        }
    }
}
