//! Persistence seams.
//!
//! The db crate implements these traits on its `SeaORM` repositories; tests
//! use the in-memory fakes in `testing`. Every service-record method takes
//! the organization explicitly and must filter on it, so a row stamped with
//! another organization behaves exactly like a missing row.

use async_trait::async_trait;
use chrono::NaiveDate;
use fieldops_shared::AppError;
use fieldops_shared::types::{ClientId, OrganizationId, ServiceRecordId, TechnicianId, UserId};
use thiserror::Error;

use crate::calendar::{MonthRange, ServiceProjection};
use crate::lifecycle::Repair;
use crate::service::{NewServiceRecord, ServiceRecord, ServiceRecordChanges};
use crate::tenancy::{Member, Membership, NewOrganization, Organization, Role};

/// Failure reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The targeted row does not exist (or is outside the given scope).
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness or precondition check failed inside the store.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (connection, timeout, driver error).
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Backend(msg) => Self::Store(msg),
        }
    }
}

/// Per-user membership tuples.
///
/// Writes other than `promote_to_admin` take the organization and only touch
/// a user currently in it; otherwise they fail with `StoreError::NotFound`.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Returns the caller's membership, or `None` when not onboarded.
    async fn get_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError>;

    /// Attaches an un-onboarded user to `organization_id` as an active admin.
    ///
    /// Fails with `StoreError::Conflict` if the user already belongs to an
    /// organization and `StoreError::NotFound` if the user does not exist.
    async fn promote_to_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), StoreError>;

    /// Loads a user.
    async fn find_member(&self, user_id: UserId) -> Result<Option<Member>, StoreError>;

    /// Loads a user by email, case-insensitively.
    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;

    /// Attaches an un-onboarded user to `organization_id` with `role`.
    ///
    /// Fails with `StoreError::Conflict` if the user already belongs to an
    /// organization.
    async fn assign(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError>;

    /// Detaches a user: organization unset, role back to member.
    async fn clear(&self, user_id: UserId, organization_id: OrganizationId)
    -> Result<(), StoreError>;

    /// Changes a member's role.
    async fn set_role(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError>;

    /// Activates or deactivates a member.
    async fn set_active(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        active: bool,
    ) -> Result<(), StoreError>;

    /// All users of an organization, active or not.
    async fn list_members(&self, organization_id: OrganizationId)
    -> Result<Vec<Member>, StoreError>;
}

/// Organization rows.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Finds an organization by id.
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError>;

    /// Returns true if any organization already uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;

    /// Inserts a new, active organization with onboarding pending.
    async fn insert_organization(&self, new: &NewOrganization)
    -> Result<Organization, StoreError>;

    /// Hard-deletes an organization. Only used to compensate a failed creation.
    async fn delete_organization(&self, id: OrganizationId) -> Result<(), StoreError>;

    /// Ids of all active organizations, for the scheduled sweep.
    async fn active_organization_ids(&self) -> Result<Vec<OrganizationId>, StoreError>;
}

/// Foreign-key existence checks used at service record creation.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// True if the client exists (in any organization).
    async fn client_exists(&self, id: ClientId) -> Result<bool, StoreError>;

    /// True if the technician exists (in any organization).
    async fn technician_exists(&self, id: TechnicianId) -> Result<bool, StoreError>;
}

/// Organization-scoped service record storage.
#[async_trait]
pub trait ServiceRecordStore: Send + Sync {
    /// Inserts a record; the organization comes from `record`.
    async fn insert_record(&self, record: &NewServiceRecord) -> Result<ServiceRecord, StoreError>;

    /// Finds a record by id within an organization.
    async fn find_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
    ) -> Result<Option<ServiceRecord>, StoreError>;

    /// Applies `changes` to a record of `organization_id`. Returns `None` if
    /// no such record exists in that organization. Never changes ownership.
    async fn update_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
        changes: &ServiceRecordChanges,
    ) -> Result<Option<ServiceRecord>, StoreError>;

    /// All records of the organization that match the drift predicate
    /// relative to `today`.
    async fn drift_candidates(
        &self,
        organization_id: OrganizationId,
        today: NaiveDate,
    ) -> Result<Vec<ServiceRecord>, StoreError>;

    /// Applies a repair only if the record still matches the drift criteria
    /// (ignoring the date, which cannot move backwards for a candidate).
    /// Returns `false` when the record was already consistent.
    async fn apply_repair(&self, repair: &Repair) -> Result<bool, StoreError>;
}

/// Month-scoped joins feeding the calendar and revenue views.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Records of `organization_id` dated inside `range`, joined with their
    /// client and technician names, ordered by date.
    async fn month_projection(
        &self,
        organization_id: OrganizationId,
        range: MonthRange,
    ) -> Result<Vec<ServiceProjection>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_app_error() {
        assert_eq!(
            AppError::from(StoreError::NotFound("x".into())).status_code(),
            404
        );
        assert_eq!(
            AppError::from(StoreError::Conflict("x".into())).status_code(),
            409
        );
        let backend = AppError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(backend.error_code(), "STORE_FAILURE");
    }
}
