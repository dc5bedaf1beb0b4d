//! Relay error type.
//!
//! Handlers return `Result<T, ApiError>`; the error renders as a JSON body
//! `{"error": "..."}`. Internal detail is logged, never sent to the caller.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::DomainError;

pub const MESSAGE_REQUIRED: &str = "Message is required.";
pub const SERVER_ERROR: &str = "Server error while processing your request.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Internal(m) => {
                error!(message = %m, "Backend error");
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR.to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput(m) => ApiError::BadRequest(m),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Renders a handler panic as the same 500 body as any other unhandled fault.
pub fn panic_response(details: Box<dyn Any + Send + 'static>) -> Response {
    let detail = details
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| details.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response =
            ApiError::from(DomainError::invalid_input("Message is required.")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_error_maps_to_internal() {
        let response = ApiError::from(DomainError::storage("disk full")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
