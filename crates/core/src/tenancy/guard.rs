//! Authorization guard.
//!
//! Pure decisions over a caller's membership tuple. Nothing here touches a
//! store: the caller looks the membership up, asks the guard, and skips the
//! data operation on `Deny`. A denial is an ordinary outcome, not an error
//! of the infrastructure, and converts into `AppError::Forbidden` only at
//! the edge.

use fieldops_shared::AppError;
use fieldops_shared::types::{OrganizationId, UserId};
use serde::Serialize;
use thiserror::Error;

use crate::tenancy::types::{Membership, Organization, Role};

/// Why the guard refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    /// The caller has not joined any organization.
    #[error("caller does not belong to any organization")]
    NoMembership,

    /// The caller's account was deactivated.
    #[error("caller account is inactive")]
    Inactive,

    /// The target organization is not the caller's.
    #[error("caller is not a member of this organization")]
    OrganizationMismatch,

    /// The caller's role is not the one required.
    #[error("operation requires role {required}, caller has {actual}")]
    InsufficientRole {
        /// Role the operation requires.
        required: Role,
        /// Role the caller holds.
        actual: Role,
    },

    /// Admins cannot remove their own membership.
    #[error("members cannot remove themselves from the organization")]
    SelfRemoval,

    /// Admins cannot give up their own admin role.
    #[error("admins cannot demote themselves")]
    SelfDemotion,

    /// Admins cannot deactivate their own account.
    #[error("members cannot deactivate themselves")]
    SelfDeactivation,

    /// The organization itself was deactivated.
    #[error("organization is inactive")]
    OrganizationInactive,

    /// Main application is locked until onboarding completes.
    #[error("organization onboarding is not complete")]
    OnboardingIncomplete,
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        Self::Forbidden(reason.to_string())
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed with the operation.
    Allow,
    /// Do not touch the data.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true for `Allow`.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts into a `Result` so callers can use `?`.
    ///
    /// # Errors
    ///
    /// Returns the deny reason.
    pub const fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// A change an admin wants to make to some member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberChange {
    /// Detach the member from the organization.
    Remove,
    /// Assign a new role.
    ChangeRole(Role),
    /// Activate or deactivate the member.
    SetActive(bool),
}

/// Stateless authorization guard.
pub struct AuthorizationGuard;

impl AuthorizationGuard {
    /// Decides whether a caller with `membership` may act on `organization_id`.
    ///
    /// Denies when there is no membership, when it is inactive, when it
    /// points at another organization, or when `required_role` is given and
    /// differs from the caller's role.
    #[must_use]
    pub fn authorize(
        membership: Option<&Membership>,
        organization_id: OrganizationId,
        required_role: Option<Role>,
    ) -> Decision {
        let Some(membership) = membership else {
            return Decision::Deny(DenyReason::NoMembership);
        };

        if !membership.active {
            return Decision::Deny(DenyReason::Inactive);
        }

        if membership.organization_id != organization_id {
            return Decision::Deny(DenyReason::OrganizationMismatch);
        }

        match required_role {
            Some(required) if membership.role != required => {
                Decision::Deny(DenyReason::InsufficientRole {
                    required,
                    actual: membership.role,
                })
            }
            _ => Decision::Allow,
        }
    }

    /// Decides whether `caller` may apply `change` to the member `target`.
    ///
    /// Member management is admin-only. On top of that an admin may not
    /// remove, demote or deactivate themselves.
    #[must_use]
    pub fn authorize_member_change(
        caller: UserId,
        membership: Option<&Membership>,
        organization_id: OrganizationId,
        target: UserId,
        change: MemberChange,
    ) -> Decision {
        let decision = Self::authorize(membership, organization_id, Some(Role::Admin));
        if !decision.is_allowed() || caller != target {
            return decision;
        }

        match change {
            MemberChange::Remove => Decision::Deny(DenyReason::SelfRemoval),
            MemberChange::ChangeRole(role) if role != Role::Admin => {
                Decision::Deny(DenyReason::SelfDemotion)
            }
            MemberChange::SetActive(false) => Decision::Deny(DenyReason::SelfDeactivation),
            MemberChange::ChangeRole(_) | MemberChange::SetActive(true) => Decision::Allow,
        }
    }

    /// Gate for the main application: the organization must be active and
    /// have completed onboarding.
    #[must_use]
    pub const fn gate(organization: &Organization) -> Decision {
        if !organization.active {
            Decision::Deny(DenyReason::OrganizationInactive)
        } else if !organization.onboarding_completo {
            Decision::Deny(DenyReason::OnboardingIncomplete)
        } else {
            Decision::Allow
        }
    }
}
