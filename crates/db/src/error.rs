//! Mapping of database failures onto application errors.

use sea_orm::{DbErr, SqlErr};
use tripdesk_core::booking::BookingError;
use tripdesk_shared::AppError;

/// Converts a `SeaORM` error, turning unique violations into conflicts.
#[must_use]
pub fn map_db_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Duplicate entry".to_string())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::Validation("Referenced record does not exist".to_string())
        }
        _ => AppError::Database(err.to_string()),
    }
}

/// Errors of the booking write paths.
#[derive(Debug, thiserror::Error)]
pub enum BookingRepoError {
    /// Business rule rejection.
    #[error(transparent)]
    Domain(#[from] BookingError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BookingRepoError> for AppError {
    fn from(err: BookingRepoError) -> Self {
        match err {
            BookingRepoError::Domain(e) => e.into(),
            BookingRepoError::Database(e) => map_db_error(e),
        }
    }
}
