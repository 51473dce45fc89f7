//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Message returned for any request without a valid session.
pub const NOT_AUTHENTICATED: &str = "Not authenticated.";

/// Errors returned by handlers, rendered as `{"error": message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<brain_core::Error> for ApiError {
    fn from(err: brain_core::Error) -> Self {
        use brain_core::Error;
        match err {
            Error::NotFound(_) | Error::CardNotFound(_) | Error::TopicNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthenticated => ApiError::Unauthorized(NOT_AUTHENTICATED.to_string()),
            Error::UnsupportedInput(msg) | Error::Conversion(msg) => ApiError::Unprocessable(msg),
            Error::Precondition(msg) => ApiError::Conflict(msg),
            // Backend message is passed through as-is.
            Error::Database(db_err) => {
                tracing::error!(error = %db_err, "Database error");
                ApiError::Internal(db_err.to_string())
            }
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
