use axum::{extract::State, Json};
use tracing::{info, instrument, warn};

use crate::{
    background::update_pipeline::RefreshResponse, extractors::refresh_request::RefreshRequest,
    state::AppState,
};

/// Runs the update pipeline to completion and reports whether it succeeded.
///
/// The response carries no snapshot; clients re-read `/gas` or `/popup`
/// afterwards.
#[instrument(skip(state))]
pub async fn post_refresh(
    State(state): State<AppState>,
    request: RefreshRequest,
) -> Json<RefreshResponse> {
    info!(action = %request.action, "Received refresh request.");

    let response = state.pipeline.refresh_now().await;
    if let Some(error) = &response.error {
        warn!(error = %error, "On-demand refresh failed");
    }

    Json(response)
}
