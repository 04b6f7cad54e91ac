use crate::ledger::LogError;
use crate::storage::StoreError;
use axum::http::StatusCode;
use tracing::error;

/// Request failure returned to the client as a short plain-text message.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Logs `err` and hides it behind `message`.
    pub fn internal(message: &str, err: impl std::error::Error) -> Self {
        error!(error = %err, "{message}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("user not found"),
            other => Self::internal("error accessing ledger", other),
        }
    }
}

impl From<LogError> for AppError {
    fn from(err: LogError) -> Self {
        let message = err.to_string();
        match err {
            LogError::UserNotFound => Self::not_found(message),
            LogError::Store(store) => Self::internal("error updating ledger", store),
            LogError::MissingFields
            | LogError::InvalidDistance
            | LogError::InvalidUnit
            | LogError::InvalidActivity => Self::bad_request(message),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
