//! Unified error handling for the server.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use spacesync_engine::{wire::ErrorBody, StoreError};

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Store(error) => match error {
                StoreError::Conflict { .. } => StatusCode::CONFLICT,
                StoreError::UnknownItem(_) | StoreError::UnknownContainer(_) => {
                    StatusCode::NOT_FOUND
                }
                StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                StoreError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
                StoreError::QuotaExceeded => StatusCode::INSUFFICIENT_STORAGE,
                StoreError::Network(_) | StoreError::Interrupted => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, %status, "Request rejected");
        }

        let body = match self {
            AppError::Store(error) => ErrorBody::from(error),
            AppError::BadRequest(message) => ErrorBody {
                message: message.clone(),
                error: StoreError::InvalidArguments(message),
            },
            AppError::Unauthorized(message) => ErrorBody {
                message: message.to_string(),
                error: StoreError::PermissionDenied(message.to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
