//! HTTP Error Mapping
//!
//! Turns domain errors into status codes with a plain-text body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use todo_list_lib::domain::DomainError;

/// A domain error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::Serialization(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            DomainError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (status, "Internal server error").into_response()
            }
            other => {
                tracing::warn!(status = %status, error = %other, "request rejected");
                (status, other.message().to_string()).into_response()
            }
        }
    }
}
