use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub imports_in_flight: usize,
    pub imports_running: usize,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let pool = state.import_service.pool();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            imports_in_flight: pool.in_flight(),
            imports_running: pool.running(),
        }),
    )
}
