use axum::{
    extract::rejection::JsonRejection,
    Json,
    http::StatusCode,
    response::{ IntoResponse, Response },
};
use log::error;
use thiserror::Error;

use crate::config::prompt::PromptError;
use crate::llm::generator::GenerationError;
use crate::models::api::ErrorResponse;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidUsername(name) =>
                ApiError::Validation(format!("Invalid username '{}'", name)),
            other => ApiError::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.clone()),
            ApiError::Generation(GenerationError::InvalidInput(m)) =>
                (StatusCode::BAD_REQUEST, "validation_error", m.clone()),
            ApiError::Generation(GenerationError::Provider(_)) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "generation_error",
                    "Failed to generate a response".to_string(),
                )
            }
            ApiError::Store(_) | ApiError::Prompt(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorResponse {
            error: kind.to_string(),
            message,
        });
        (status, body).into_response()
    }
}
