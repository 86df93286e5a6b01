use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::engine::spoken::SpokenNumberError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("caller location is unknown")]
    LocationUnknown,

    #[error("transit service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("malformed transit feed: {0}")]
    MalformedFeed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SpokenNumberError> for AppError {
    fn from(err: SpokenNumberError) -> Self {
        AppError::InvalidLocation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) | AppError::LocationUnknown => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::InvalidLocation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable(_) | AppError::MalformedFeed(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
