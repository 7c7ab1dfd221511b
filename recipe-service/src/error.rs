use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipebook_shared::{error::StoreError, models::ErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or incomplete request input
    #[error("{0}")]
    Validation(String),

    /// Failure reported by the external store, surfaced with its own message
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::Validation(format!("Missing required field: {}", field))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Malformed input is reported as 500, same as store failures
            AppError::Validation(_) | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Validation(msg) => tracing::warn!("Validation error: {}", msg),
            AppError::Store(err) => tracing::error!("Store error: {}", err),
            AppError::MethodNotAllowed => tracing::warn!("Method not allowed"),
        }

        let message = self.to_string();
        tracing::info!("Returning error response: status={}, message={}", status, message);
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
