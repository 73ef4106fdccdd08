//! Service record error types.

use fieldops_shared::AppError;
use fieldops_shared::types::{ClientId, ServiceRecordId, TechnicianId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while creating or editing service records.
#[derive(Debug, Error)]
pub enum ServiceRecordError {
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The update carried no changes.
    #[error("no fields provided for update")]
    EmptyUpdate,

    /// The referenced client does not exist.
    #[error("client {0} not found")]
    ClientNotFound(ClientId),

    /// The referenced technician does not exist.
    #[error("technician {0} not found")]
    TechnicianNotFound(TechnicianId),

    /// No such record in the caller's organization.
    #[error("service record {0} not found")]
    NotFound(ServiceRecordId),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceRecordError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ServiceRecordError> for AppError {
    fn from(err: ServiceRecordError) -> Self {
        match err {
            ServiceRecordError::Invalid { field, reason } => Self::validation(field, reason),
            ServiceRecordError::EmptyUpdate => Self::validation("body", err.to_string()),
            ServiceRecordError::ClientNotFound(_)
            | ServiceRecordError::TechnicianNotFound(_)
            | ServiceRecordError::NotFound(_) => Self::NotFound(err.to_string()),
            ServiceRecordError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping() {
        let invalid: AppError = ServiceRecordError::invalid("date", "malformed").into();
        assert!(matches!(invalid, AppError::Validation { ref field, .. } if field == "date"));

        let missing: AppError = ServiceRecordError::NotFound(ServiceRecordId::new()).into();
        assert_eq!(missing.status_code(), 404);

        let client: AppError = ServiceRecordError::ClientNotFound(ClientId::new()).into();
        assert_eq!(client.status_code(), 404);

        let store: AppError = ServiceRecordError::Store(StoreError::Backend("down".into())).into();
        assert_eq!(store.status_code(), 500);
    }
}
