//! Per-request tenant access check.
//!
//! Looks the caller's membership up (no caching), runs the guard, then
//! loads the organization and, for the main application, applies the
//! active/onboarding gate.

use fieldops_shared::AppError;
use fieldops_shared::types::{OrganizationId, UserId};
use thiserror::Error;
use tracing::debug;

use crate::store::{MembershipStore, OrganizationStore, StoreError};
use crate::tenancy::guard::{AuthorizationGuard, DenyReason};
use crate::tenancy::types::{Membership, Organization, Role};

/// Which part of the product is being reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Organization settings and members; reachable during onboarding.
    Management,
    /// Service records, calendar, revenue and reconciliation.
    Application,
}

/// A granted access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    /// Caller's membership tuple.
    pub membership: Membership,
    /// Target organization.
    pub organization: Organization,
}

/// Errors from an access check.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The guard or the gate refused.
    #[error(transparent)]
    Denied(#[from] DenyReason),

    /// The organization row is gone.
    #[error("organization {0} not found")]
    OrganizationNotFound(OrganizationId),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Denied(reason) => reason.into(),
            AccessError::OrganizationNotFound(_) => Self::NotFound(err.to_string()),
            AccessError::Store(e) => e.into(),
        }
    }
}

/// Resolves and authorizes tenant access.
pub struct TenantAccess<M, O> {
    memberships: M,
    organizations: O,
}

impl<M, O> TenantAccess<M, O>
where
    M: MembershipStore,
    O: OrganizationStore,
{
    /// Creates the checker over the given stores.
    pub const fn new(memberships: M, organizations: O) -> Self {
        Self {
            memberships,
            organizations,
        }
    }

    /// Checks that `caller` may act on `organization_id`.
    ///
    /// # Errors
    ///
    /// - `Denied` when the guard or, for `Scope::Application`, the gate refuses
    /// - `OrganizationNotFound` when the organization row is missing
    /// - `Store` on lookup failure
    pub async fn check(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        required_role: Option<Role>,
        scope: Scope,
    ) -> Result<Access, AccessError> {
        let membership = self.memberships.get_membership(caller).await?;

        if let Err(reason) =
            AuthorizationGuard::authorize(membership.as_ref(), organization_id, required_role)
                .into_result()
        {
            debug!(user_id = %caller, org_id = %organization_id, %reason, "Access denied");
            return Err(reason.into());
        }

        let organization = self
            .organizations
            .find_organization(organization_id)
            .await?
            .ok_or(AccessError::OrganizationNotFound(organization_id))?;

        if scope == Scope::Application {
            AuthorizationGuard::gate(&organization).into_result()?;
        }

        let membership = membership.ok_or(AccessError::Denied(DenyReason::NoMembership))?;
        Ok(Access {
            membership,
            organization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    fn access(store: &InMemoryStore) -> TenantAccess<InMemoryStore, InMemoryStore> {
        TenantAccess::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_member_granted() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let user = store.add_member(org, Role::Member);

        let granted = access(&store)
            .check(user, org, None, Scope::Application)
            .await
            .unwrap();

        assert_eq!(granted.organization.id, org);
        assert_eq!(granted.membership.role, Role::Member);
    }

    #[tokio::test]
    async fn test_cross_tenant_denied() {
        let store = InMemoryStore::default();
        let own = store.add_organization("UTC", true);
        let other = store.add_organization("UTC", true);
        let user = store.add_member(own, Role::Admin);

        let err = access(&store)
            .check(user, other, None, Scope::Management)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AccessError::Denied(DenyReason::OrganizationMismatch)
        ));
        assert_eq!(AppError::from(err).status_code(), 403);
    }

    #[tokio::test]
    async fn test_onboarding_gates_application_only() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", false);
        let admin = store.add_member(org, Role::Admin);
        let access = access(&store);

        assert!(
            access
                .check(admin, org, Some(Role::Admin), Scope::Management)
                .await
                .is_ok()
        );
        let err = access
            .check(admin, org, None, Scope::Application)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AccessError::Denied(DenyReason::OnboardingIncomplete)
        ));
    }

    #[tokio::test]
    async fn test_inactive_organization_gated() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let user = store.add_member(org, Role::Member);
        store.deactivate_organization(org);

        let err = access(&store)
            .check(user, org, None, Scope::Application)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AccessError::Denied(DenyReason::OrganizationInactive)
        ));
    }

    #[tokio::test]
    async fn test_inactive_user_denied() {
        let store = InMemoryStore::default();
        let org = store.add_organization("UTC", true);
        let user = store.add_member(org, Role::Member);
        store.deactivate_user(user);

        let err = access(&store)
            .check(user, org, None, Scope::Management)
            .await
            .unwrap_err();

        assert!(matches!(err, AccessError::Denied(DenyReason::Inactive)));
    }
}
