//! Batch reconciliation of drifted service records.
//!
//! Candidates are selected once, up front. Each repair is then written
//! independently with at most `concurrency` writes in flight, and the
//! per-record outcomes are folded into a [`ReconciliationReport`]. There is
//! no batch transaction: a failed write is reported and the rest continue,
//! so an interrupted run is partial progress and safe to re-run.

use fieldops_shared::types::OrganizationId;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::lifecycle::drift::plan_repair;
use crate::lifecycle::types::{ReconcileError, ReconciliationReport, RecordOutcome};
use crate::store::{OrganizationStore, ServiceRecordStore};

/// Default number of concurrent repair writes.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Reconciles drifted records, one organization per run.
pub struct ReconciliationEngine<S, O, C> {
    records: S,
    organizations: O,
    clock: C,
    concurrency: usize,
}

impl<S, O, C> ReconciliationEngine<S, O, C>
where
    S: ServiceRecordStore,
    O: OrganizationStore,
    C: Clock,
{
    /// Creates an engine. A concurrency of 0 is treated as 1.
    pub fn new(records: S, organizations: O, clock: C, concurrency: usize) -> Self {
        Self {
            records,
            organizations,
            clock,
            concurrency: concurrency.max(1),
        }
    }

    /// Repairs every drifted record of `organization_id`.
    ///
    /// # Errors
    ///
    /// Fails only if the organization or the candidate set cannot be loaded.
    /// Per-record failures are reported in the returned report.
    pub async fn reconcile(
        &self,
        organization_id: OrganizationId,
    ) -> Result<ReconciliationReport, ReconcileError> {
        let organization = self
            .organizations
            .find_organization(organization_id)
            .await?
            .ok_or(ReconcileError::OrganizationNotFound(organization_id))?;

        let tz = organization.tz();
        let today = self.clock.today(tz);
        let candidates = self.records.drift_candidates(organization_id, today).await?;

        info!(
            org_id = %organization_id,
            %today,
            candidates = candidates.len(),
            "Reconciliation started"
        );

        let initial = ReconciliationReport::new(organization_id, today, candidates.len());
        if candidates.is_empty() {
            return Ok(initial);
        }

        let report = stream::iter(candidates)
            .map(|record| async move {
                let repair = plan_repair(&record, tz);
                let outcome = match self.records.apply_repair(&repair).await {
                    Ok(true) => RecordOutcome::Updated,
                    Ok(false) => {
                        debug!(record_id = %record.id, "Record already consistent, skipped");
                        RecordOutcome::Skipped
                    }
                    Err(e) => {
                        warn!(record_id = %record.id, error = %e, "Record repair failed");
                        RecordOutcome::Failed(e.to_string())
                    }
                };
                (record.id, outcome)
            })
            .buffer_unordered(self.concurrency)
            .fold(initial, |report, (record_id, outcome)| async move {
                report.record(record_id, outcome)
            })
            .await;

        info!(
            org_id = %organization_id,
            updated = report.updated_count,
            skipped = report.skipped_count,
            failed = report.per_record_errors.len(),
            "Reconciliation finished"
        );

        Ok(report)
    }

    /// Reconciles every active organization in turn.
    ///
    /// An organization that fails to start is logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the list of active organizations cannot be loaded.
    pub async fn sweep(&self) -> Result<Vec<ReconciliationReport>, ReconcileError> {
        let organization_ids = self.organizations.active_organization_ids().await?;
        let mut reports = Vec::with_capacity(organization_ids.len());

        for organization_id in organization_ids {
            match self.reconcile(organization_id).await {
                Ok(report) => reports.push(report),
                Err(e) => error!(org_id = %organization_id, error = %e, "Reconciliation failed"),
            }
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::service::{PaymentStatus, ServiceStatus};
    use crate::store::StoreError;
    use crate::testing::{InMemoryStore, sample_record};
    use chrono::{NaiveDate, TimeZone, Utc};
    use fieldops_shared::types::ServiceRecordId;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Noon UTC on 2024-03-10 is 09:00 in São Paulo: today is March 10th.
    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap())
    }

    fn engine(store: &InMemoryStore) -> ReconciliationEngine<InMemoryStore, InMemoryStore, FixedClock> {
        ReconciliationEngine::new(store.clone(), store.clone(), clock(), DEFAULT_CONCURRENCY)
    }

    fn drifted(store: &InMemoryStore, org: OrganizationId, date: NaiveDate) -> ServiceRecordId {
        let mut record = sample_record(org, date);
        record.payment_status = PaymentStatus::Pago;
        store.insert_raw_record(record)
    }

    #[tokio::test]
    async fn test_repairs_drifted_and_is_idempotent() {
        let store = InMemoryStore::default();
        let org = store.add_organization("America/Sao_Paulo", true);
        let a = drifted(&store, org, day(2024, 3, 1));
        let b = drifted(&store, org, day(2024, 3, 9));
        let engine = engine(&store);

        let first = engine.reconcile(org).await.unwrap();
        assert_eq!(first.total_candidates, 2);
        assert_eq!(first.updated_count, 2);
        assert!(first.is_clean());
        for id in [a, b] {
            let record = store.record(id).unwrap();
            assert_eq!(record.status, ServiceStatus::Concluido);
            assert!(record.completed_date.is_some());
        }

        let second = engine.reconcile(org).await.unwrap();
        assert_eq!(second.total_candidates, 0);
        assert_eq!(second.updated_count, 0);
    }

    #[tokio::test]
    async fn test_ignores_today_and_non_drifted() {
        let store = InMemoryStore::default();
        let org = store.add_organization("America/Sao_Paulo", true);
        let today = drifted(&store, org, day(2024, 3, 10));

        let mut completed = sample_record(org, day(2024, 3, 1));
        completed.payment_status = PaymentStatus::Pago;
        completed.completed_date = Some(Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap());
        let completed = store.insert_raw_record(completed);

        let unpaid = store.insert_raw_record(sample_record(org, day(2024, 3, 1)));

        let report = engine(&store).reconcile(org).await.unwrap();

        assert_eq!(report.total_candidates, 0);
        for id in [today, completed, unpaid] {
            assert_ne!(store.record(id).unwrap().status, ServiceStatus::Concluido);
        }
    }

    #[tokio::test]
    async fn test_completion_prefers_payment_date() {
        let store = InMemoryStore::default();
        let org = store.add_organization("America/Sao_Paulo", true);
        let paid_at = Utc.with_ymd_and_hms(2024, 3, 10, 3, 0, 0).unwrap();

        let mut with_payment = sample_record(org, day(2024, 3, 5));
        with_payment.payment_status = PaymentStatus::Pago;
        with_payment.payment_date = Some(paid_at);
        let with_payment = store.insert_raw_record(with_payment);
        let without_payment = drifted(&store, org, day(2024, 3, 5));

        engine(&store).reconcile(org).await.unwrap();

        assert_eq!(store.record(with_payment).unwrap().completed_date, Some(paid_at));
        // 2024-03-05 23:59:59 in São Paulo.
        assert_eq!(
            store.record(without_payment).unwrap().completed_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 6, 2, 59, 59).unwrap())
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let ok = drifted(&store, org, day(2024, 3, 1));
        let broken = drifted(&store, org, day(2024, 3, 2));
        store.fail_repair_for(broken);

        let report = engine(&store).reconcile(org).await.unwrap();

        assert_eq!(report.total_candidates, 2);
        assert_eq!(report.updated_count, 1);
        assert_eq!(report.per_record_errors.len(), 1);
        assert_eq!(report.per_record_errors[0].record_id, broken);
        assert_eq!(store.record(ok).unwrap().status, ServiceStatus::Concluido);
        assert_eq!(store.record(broken).unwrap().status, ServiceStatus::Pendente);
    }

    #[tokio::test]
    async fn test_racing_repair_is_skipped() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let raced = drifted(&store, org, day(2024, 3, 1));
        store.race_repair_for(raced);

        let report = engine(&store).reconcile(org).await.unwrap();

        assert_eq!(report.total_candidates, 1);
        assert_eq!(report.updated_count, 0);
        assert_eq!(report.skipped_count, 1);
        assert!(report.is_clean());
        assert_eq!(store.record(raced).unwrap().status, ServiceStatus::Concluido);
    }

    #[tokio::test]
    async fn test_scoped_to_one_organization() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let other = store.add_organization("UTC", true);
        let foreign = drifted(&store, other, day(2024, 3, 1));

        let report = engine(&store).reconcile(org).await.unwrap();

        assert_eq!(report.total_candidates, 0);
        assert_eq!(store.record(foreign).unwrap().status, ServiceStatus::Pendente);
    }

    #[tokio::test]
    async fn test_unknown_organization() {
        let store = InMemoryStore::default();
        let result = engine(&store).reconcile(OrganizationId::new()).await;
        assert!(matches!(result, Err(ReconcileError::OrganizationNotFound(_))));
    }

    #[tokio::test]
    async fn test_candidate_load_failure() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        store.fail_candidates();

        let result = engine(&store).reconcile(org).await;
        assert!(matches!(result, Err(ReconcileError::Store(StoreError::Backend(_)))));
    }

    #[tokio::test]
    async fn test_sweep_covers_active_organizations() {
        let store = InMemoryStore::default();
        let active = store.add_organization("UTC", true);
        let inactive = store.add_organization("UTC", true);
        store.deactivate_organization(inactive);
        drifted(&store, active, day(2024, 3, 1));
        let untouched = drifted(&store, inactive, day(2024, 3, 1));

        let reports = engine(&store).sweep().await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].organization_id, active);
        assert_eq!(reports[0].updated_count, 1);
        assert_eq!(store.record(untouched).unwrap().status, ServiceStatus::Pendente);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_runs() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        drifted(&store, org, day(2024, 3, 1));
        let engine = ReconciliationEngine::new(store.clone(), store.clone(), clock(), 0);

        let report = engine.reconcile(org).await.unwrap();
        assert_eq!(report.updated_count, 1);
    }
}
