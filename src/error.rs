//! Error types for the Shelfmark ledger

use thiserror::Error;

/// Main application error type.
///
/// Every precondition the ledger can diagnose gets its own variant so that
/// callers can present a targeted message instead of a generic failure.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User {user_id} already holds an active loan for book {book_id}")]
    DuplicateLoan { user_id: i64, book_id: i64 },

    #[error("No copies of book {0} are available")]
    NoCopiesAvailable(i64),

    #[error("User {user_id} has no active loan for book {book_id}")]
    NoActiveLoan { user_id: i64, book_id: i64 },

    #[error("Transaction exceeded its time budget")]
    Timeout,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(e.into())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
