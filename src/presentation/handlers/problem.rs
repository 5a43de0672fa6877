use std::io;

use axum::Json;
use axum::http::header::{CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::StagingStoreError;
use crate::application::services::ImportError;

const URN_PREFIX: &str = "urn:talk-catalog:";
const PROBLEM_JSON: &str = "application/problem+json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemType {
    ResourceNotFound,
    CsvImportError,
    TooManyImports,
    UploadTooLarge,
    InvalidRequest,
    InternalError,
}

impl ProblemType {
    fn slug(&self) -> &'static str {
        match self {
            ProblemType::ResourceNotFound => "resource-not-found",
            ProblemType::CsvImportError => "csv-import-error",
            ProblemType::TooManyImports => "too-many-imports",
            ProblemType::UploadTooLarge => "upload-too-large",
            ProblemType::InvalidRequest => "invalid-request",
            ProblemType::InternalError => "internal-error",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ProblemType::ResourceNotFound => "Resource Not Found",
            ProblemType::CsvImportError => "CSV Import Error",
            ProblemType::TooManyImports => "Too Many Concurrent Imports",
            ProblemType::UploadTooLarge => "Upload Too Large",
            ProblemType::InvalidRequest => "Invalid Request",
            ProblemType::InternalError => "Internal Server Error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ProblemType::ResourceNotFound => StatusCode::NOT_FOUND,
            ProblemType::CsvImportError | ProblemType::InvalidRequest => StatusCode::BAD_REQUEST,
            ProblemType::TooManyImports => StatusCode::SERVICE_UNAVAILABLE,
            ProblemType::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProblemType::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// RFC 9457 problem document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
}

impl ProblemDetail {
    pub fn new(kind: ProblemType, detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            problem_type: format!("{}{}", URN_PREFIX, kind.slug()),
            title: kind.title().to_string(),
            status: kind.status().as_u16(),
            detail: detail.into(),
            instance: instance.into(),
            retry_after_seconds: None,
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after_seconds = Some(seconds);
        self
    }
}

impl IntoResponse for ProblemDetail {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let retry_after = self.retry_after_seconds;

        let mut response = (status, Json(self)).into_response();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        if let Some(seconds) = retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

/// Maps an import failure to the problem the client sees.
///
/// Store and staging faults are logged here and reported without detail.
pub fn import_error_problem(
    error: &ImportError,
    instance: &str,
    retry_after_seconds: u64,
) -> ProblemDetail {
    match error {
        ImportError::Rejected(_) => ProblemDetail::new(
            ProblemType::TooManyImports,
            "Too many imports are in progress. Retry later.",
            instance,
        )
        .with_retry_after(retry_after_seconds),
        ImportError::EmptyFile => {
            ProblemDetail::new(ProblemType::CsvImportError, "File is empty", instance)
        }
        ImportError::Staging(StagingStoreError::Io(e))
            if e.kind() == io::ErrorKind::FileTooLarge =>
        {
            ProblemDetail::new(
                ProblemType::UploadTooLarge,
                "Upload exceeds the configured size limit",
                instance,
            )
        }
        ImportError::Staging(StagingStoreError::Io(e)) => ProblemDetail::new(
            ProblemType::CsvImportError,
            format!("Failed to read upload: {}", e),
            instance,
        ),
        ImportError::NotFound(id) => ProblemDetail::new(
            ProblemType::ResourceNotFound,
            format!("Import not found with id: {}", id),
            instance,
        ),
        ImportError::Staging(_) | ImportError::Repository(_) => {
            tracing::error!(error = %error, "Import request failed");
            ProblemDetail::new(
                ProblemType::InternalError,
                "An unexpected error occurred",
                instance,
            )
        }
    }
}
