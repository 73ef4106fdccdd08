//! Mapping from driver errors to store errors.

use fieldops_core::StoreError;
use sea_orm::{DbErr, SqlErr};
use tracing::error;

/// Converts a `SeaORM` error into the store taxonomy.
///
/// Unique violations become `Conflict` and foreign-key violations
/// `NotFound`; everything else is a backend failure and is logged here.
pub fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StoreError::NotFound(detail),
        _ => {
            if matches!(err, DbErr::RecordNotFound(_)) {
                return StoreError::NotFound(err.to_string());
            }
            error!(error = %err, "Database error");
            StoreError::Backend(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_found() {
        let err = store_error(DbErr::RecordNotFound("users".into()));
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_other_errors_are_backend() {
        let err = store_error(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("connection reset")));
    }
}
