//! Service record create/get/update.

use fieldops_shared::types::{OrganizationId, ServiceRecordId};
use tracing::info;

use crate::service::error::ServiceRecordError;
use crate::service::input::{CreateServiceRecordInput, UpdateServiceRecordInput};
use crate::service::types::ServiceRecord;
use crate::store::{ReferenceStore, ServiceRecordStore};

/// Service record operations for an already-authorized caller.
///
/// The organization is always the caller's, resolved by the guard; it is
/// never read from the payload.
pub struct ServiceRecordService<S, R> {
    records: S,
    references: R,
}

impl<S, R> ServiceRecordService<S, R>
where
    S: ServiceRecordStore,
    R: ReferenceStore,
{
    /// Creates the service over the given stores.
    pub const fn new(records: S, references: R) -> Self {
        Self {
            records,
            references,
        }
    }

    /// Creates a record stamped with `organization_id`.
    ///
    /// # Errors
    ///
    /// - `Invalid` for malformed input
    /// - `ClientNotFound` / `TechnicianNotFound` for dangling references
    /// - `Store` on persistence failure
    pub async fn create(
        &self,
        organization_id: OrganizationId,
        input: CreateServiceRecordInput,
    ) -> Result<ServiceRecord, ServiceRecordError> {
        let new = input.validate(organization_id)?;

        if !self.references.client_exists(new.client_id).await? {
            return Err(ServiceRecordError::ClientNotFound(new.client_id));
        }
        if !self.references.technician_exists(new.technician_id).await? {
            return Err(ServiceRecordError::TechnicianNotFound(new.technician_id));
        }

        let record = self.records.insert_record(&new).await?;

        info!(
            org_id = %organization_id,
            record_id = %record.id,
            date = %record.date,
            "Service record created"
        );

        Ok(record)
    }

    /// Fetches a record of `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when absent or owned by another organization.
    pub async fn get(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
    ) -> Result<ServiceRecord, ServiceRecordError> {
        self.records
            .find_record(organization_id, id)
            .await?
            .ok_or(ServiceRecordError::NotFound(id))
    }

    /// Applies a partial update to a record of `organization_id`.
    ///
    /// # Errors
    ///
    /// - `Invalid` / `EmptyUpdate` for a bad payload
    /// - `ClientNotFound` / `TechnicianNotFound` for dangling references
    /// - `NotFound` when absent or owned by another organization
    pub async fn update(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
        input: UpdateServiceRecordInput,
    ) -> Result<ServiceRecord, ServiceRecordError> {
        let changes = input.validate()?;

        if let Some(client_id) = changes.client_id
            && !self.references.client_exists(client_id).await?
        {
            return Err(ServiceRecordError::ClientNotFound(client_id));
        }
        if let Some(technician_id) = changes.technician_id
            && !self.references.technician_exists(technician_id).await?
        {
            return Err(ServiceRecordError::TechnicianNotFound(technician_id));
        }

        let record = self
            .records
            .update_record(organization_id, id, &changes)
            .await?
            .ok_or(ServiceRecordError::NotFound(id))?;

        info!(org_id = %organization_id, record_id = %id, "Service record updated");

        Ok(record)
    }
}
