use std::io;

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::domain::ImportJobId;
use crate::presentation::handlers::problem::{ProblemDetail, ProblemType, import_error_problem};
use crate::presentation::state::AppState;

pub const IMPORT_CSV_PATH: &str = "/api/v1/import/csv";
pub const IMPORT_STATUS_PATH: &str = "/api/v1/import/status";

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInitResponse {
    pub import_id: String,
    pub message: String,
    pub status_url: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn import_csv_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(f)) if f.name() == Some(FILE_FIELD) => f,
        Ok(_) => {
            tracing::warn!("Import request without a file part");
            return ProblemDetail::new(
                ProblemType::CsvImportError,
                "No file uploaded: expected a multipart part named 'file'",
                IMPORT_CSV_PATH,
            )
            .into_response();
        }
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %e, "Upload exceeds body limit");
            return ProblemDetail::new(
                ProblemType::UploadTooLarge,
                "Upload exceeds the configured size limit",
                IMPORT_CSV_PATH,
            )
            .into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read multipart");
            return ProblemDetail::new(
                ProblemType::CsvImportError,
                format!("Failed to read multipart: {}", e),
                IMPORT_CSV_PATH,
            )
            .into_response();
        }
    };

    tracing::debug!(filename = ?field.file_name(), "Receiving CSV upload");

    let upload = field.map_err(upload_error).boxed();

    match state.import_service.start_import(upload, None).await {
        Ok(import_id) => (
            StatusCode::ACCEPTED,
            Json(ImportInitResponse {
                import_id: import_id.to_string(),
                message: "CSV import started. Check status using the provided URL.".to_string(),
                status_url: status_url(state.settings.server.public_base_url.as_deref(), import_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "CSV import not started");
            import_error_problem(&e, IMPORT_CSV_PATH, state.settings.import.retry_after_seconds)
                .into_response()
        }
    }
}

/// Keeps the body-limit case distinguishable once it crosses the staging port.
fn upload_error(error: MultipartError) -> io::Error {
    let kind = if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::ErrorKind::FileTooLarge
    } else {
        io::ErrorKind::InvalidData
    };
    io::Error::new(kind, error.body_text())
}

fn status_url(public_base_url: Option<&str>, import_id: ImportJobId) -> String {
    let base = public_base_url.unwrap_or_default().trim_end_matches('/');
    format!("{}{}/{}", base, IMPORT_STATUS_PATH, import_id)
}
