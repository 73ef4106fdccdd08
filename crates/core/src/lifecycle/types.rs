//! Reconciliation outcomes.

use chrono::NaiveDate;
use fieldops_shared::AppError;
use fieldops_shared::types::{OrganizationId, ServiceRecordId};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Outcome of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Repair written.
    Updated,
    /// Already consistent when the write arrived.
    Skipped,
    /// The write failed.
    Failed(String),
}

/// A candidate whose repair failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    /// Failed record.
    pub record_id: ServiceRecordId,
    /// Store message.
    pub message: String,
}

/// Result of reconciling one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Organization reconciled.
    pub organization_id: OrganizationId,
    /// Local date the predicate was evaluated against.
    pub today: NaiveDate,
    /// Records matching the predicate at selection time.
    pub total_candidates: usize,
    /// Records repaired by this run.
    pub updated_count: usize,
    /// Records found already consistent at write time.
    pub skipped_count: usize,
    /// Per-record failures; they never abort the batch.
    pub per_record_errors: Vec<RecordFailure>,
}

impl ReconciliationReport {
    /// Empty report for `organization_id`.
    #[must_use]
    pub const fn new(organization_id: OrganizationId, today: NaiveDate, total: usize) -> Self {
        Self {
            organization_id,
            today,
            total_candidates: total,
            updated_count: 0,
            skipped_count: 0,
            per_record_errors: Vec::new(),
        }
    }

    /// Folds one outcome into the report.
    #[must_use]
    pub fn record(mut self, record_id: ServiceRecordId, outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Updated => self.updated_count += 1,
            RecordOutcome::Skipped => self.skipped_count += 1,
            RecordOutcome::Failed(message) => {
                self.per_record_errors
                    .push(RecordFailure { record_id, message });
            }
        }
        self
    }

    /// True when every candidate was either updated or skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.per_record_errors.is_empty()
    }
}

/// Errors that prevent a reconciliation run from starting.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Unknown organization.
    #[error("organization {0} not found")]
    OrganizationNotFound(OrganizationId),

    /// Loading the organization or the candidates failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::OrganizationNotFound(_) => Self::NotFound(err.to_string()),
            ReconcileError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_counts() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let failed = ServiceRecordId::new();

        let report = ReconciliationReport::new(OrganizationId::new(), today, 3)
            .record(ServiceRecordId::new(), RecordOutcome::Updated)
            .record(ServiceRecordId::new(), RecordOutcome::Skipped)
            .record(failed, RecordOutcome::Failed("timeout".into()));

        assert_eq!(report.updated_count, 1);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.per_record_errors.len(), 1);
        assert_eq!(report.per_record_errors[0].record_id, failed);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_report_wire_names() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let report = ReconciliationReport::new(OrganizationId::new(), today, 0);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalCandidates"], 0);
        assert_eq!(json["updatedCount"], 0);
        assert_eq!(json["skippedCount"], 0);
        assert_eq!(json["today"], "2024-03-10");
        assert!(json["perRecordErrors"].as_array().unwrap().is_empty());
    }
}
