use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::pipeline_error::StorageError;

pub enum ApiError {
    InternalServerError,
    NoData,
    InvalidRequest(String),
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "Something bad happened.".to_owned(),
            ),
            ApiError::NoData => (
                StatusCode::NOT_FOUND,
                "Not Found",
                "No data available".to_owned(),
            ),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
        };

        let body = ApiErrorResponse { error, message };

        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(_err: StorageError) -> Self {
        ApiError::InternalServerError
    }
}
