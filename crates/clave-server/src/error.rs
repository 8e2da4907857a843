use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clave_core::error::CoreError;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to HTTP clients.
///
/// Domain errors pass through from the core crate; the remaining variants
/// cover problems that only exist at the HTTP edge, like missing request
/// fields or unparseable dates.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    BadRequest(String),

    #[error("invalid credentials")]
    Unauthorized,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Core(CoreError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_expected_statuses() {
        let not_found = ApiError::Core(CoreError::NotFound("x".to_string()));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = ApiError::Core(CoreError::InvalidInput("x".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let conflict = ApiError::Core(CoreError::Conflict("x".to_string()));
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        assert_eq!(
            ApiError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
