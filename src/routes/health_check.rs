use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub message: String,
    pub pipeline_running: bool,
}

/// Reports liveness without waiting on an in-flight pipeline run.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let pipeline_running = state.pipeline.is_running();
    Json(HealthCheckResponse {
        message: "Server is running.".to_owned(),
        pipeline_running,
    })
}
