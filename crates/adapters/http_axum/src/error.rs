//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use accessline_domain::error::{AccessLineError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AccessLineError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(AccessLineError);

impl ApiError {
    /// A path or body identifier that does not parse.
    #[must_use]
    pub fn invalid_id(value: &str) -> Self {
        Self(ValidationError::InvalidId(value.to_string()).into())
    }
}

impl From<AccessLineError> for ApiError {
    fn from(err: AccessLineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AccessLineError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AccessLineError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            AccessLineError::Allocation(err) => {
                tracing::warn!(error = %err, "tag allocation exhausted");
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            AccessLineError::Programming(err) => {
                tracing::error!(error = %err, "programming error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AccessLineError::Dependency(err) => {
                tracing::error!(error = %err, "service graph error");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AccessLineError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
