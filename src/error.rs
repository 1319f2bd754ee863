//! Error handling module
//!
//! Centralized HTTP response conversion for the error taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            AppError::Ledger(err) => match err {
                // 400 Bad Request: caller-correctable, no side effect
                LedgerError::NonPositiveAmount | LedgerError::InvalidAmount(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", None)
                }
                LedgerError::EmptyName => (StatusCode::BAD_REQUEST, "invalid_name", None),
                LedgerError::SameAccountTransfer => {
                    (StatusCode::BAD_REQUEST, "same_account_transfer", None)
                }
                LedgerError::TargetAccountNotFound => {
                    (StatusCode::BAD_REQUEST, "target_account_not_found", None)
                }
                LedgerError::SourceAccountNotFound => {
                    (StatusCode::BAD_REQUEST, "source_account_not_found", None)
                }
                LedgerError::InsufficientBalance => {
                    (StatusCode::BAD_REQUEST, "insufficient_balance", None)
                }

                // 404 Not Found
                LedgerError::AccountNotFound(id) => {
                    (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
                }

                // 409 Conflict: transient, caller may retry
                LedgerError::Conflict { .. } => (StatusCode::CONFLICT, "transfer_conflict", None),

                // 500 Internal Server Error
                LedgerError::Storage(e) => {
                    tracing::error!("storage error: {:?}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
                }
            },
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

// Store errors that reach the HTTP layer without passing through the
// ledger taxonomy are storage failures.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Ledger(LedgerError::Storage(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: LedgerError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(LedgerError::NonPositiveAmount), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(LedgerError::InsufficientBalance), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(LedgerError::TargetAccountNotFound),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(LedgerError::AccountNotFound(7)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(LedgerError::Conflict { attempts: 3 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LedgerError::Storage(StoreError::Conflict)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
