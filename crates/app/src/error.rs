//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use risk_lib::{InputError, PredictionError};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input")]
    InvalidInput(Vec<InputError>),

    #[error("prediction unavailable: model not loaded")]
    PredictionDisabled,

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::InvalidInput(errors) => (
                StatusCode::BAD_REQUEST,
                errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            ),
            ApiError::PredictionDisabled => (StatusCode::SERVICE_UNAVAILABLE, Vec::new()),
            ApiError::Prediction(e) => {
                tracing::error!("Prediction error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "details": details,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
