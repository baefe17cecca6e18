use axum::{extract::State, Json};

use crate::{background::badge::BadgeState, errors::api_error::ApiError, state::AppState};

/// Current badge text and color, 404 until the first render.
pub async fn get_badge(State(state): State<AppState>) -> Result<Json<BadgeState>, ApiError> {
    state.badge.current().map(Json).ok_or(ApiError::NoData)
}
