use crate::{background::update_pipeline::ON_DEMAND_TRIGGER, errors::api_error::ApiError};
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::Deserialize;

/// Body of an on-demand refresh request: `{ "action": "fetchGasPrice" }`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub action: String,
}

impl<S> FromRequest<S> for RefreshRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<RefreshRequest>::from_request(req, state)
            .await
            .map_err(|err| ApiError::InvalidRequest(err.body_text()))?;

        if request.action != ON_DEMAND_TRIGGER {
            return Err(ApiError::InvalidRequest(format!(
                "Unknown action `{}`.",
                request.action
            )));
        }

        Ok(request)
    }
}
