//! Membership management: invite, remove, change role, (de)activate.
//!
//! Every operation resolves the caller's own membership first and asks the
//! guard. The target must currently belong to the same organization;
//! anyone else is reported as not found.

use fieldops_shared::AppError;
use fieldops_shared::types::{OrganizationId, UserId};
use thiserror::Error;
use tracing::info;

use crate::store::{MembershipStore, StoreError};
use crate::tenancy::guard::{AuthorizationGuard, DenyReason, MemberChange};
use crate::tenancy::types::{Member, Role};

/// Errors from membership management.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// The guard refused the operation.
    #[error(transparent)]
    Denied(#[from] DenyReason),

    /// No such user, or not in this organization.
    #[error("user not found")]
    UserNotFound,

    /// The invited user already belongs to an organization.
    #[error("user already belongs to an organization")]
    AlreadyMember,

    /// Inactive users cannot be invited.
    #[error("inactive users cannot be added to an organization")]
    InactiveUser,

    /// Unknown role name.
    #[error("unknown role `{0}`")]
    InvalidRole(String),

    /// Nothing to change.
    #[error("no fields provided for update")]
    EmptyUpdate,

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MembershipError> for AppError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Denied(reason) => reason.into(),
            MembershipError::UserNotFound => Self::NotFound(err.to_string()),
            MembershipError::AlreadyMember => Self::Conflict(err.to_string()),
            MembershipError::InactiveUser => Self::BusinessRule(err.to_string()),
            MembershipError::InvalidRole(_) => Self::validation("role", err.to_string()),
            MembershipError::EmptyUpdate => Self::validation("body", err.to_string()),
            MembershipError::Store(e) => e.into(),
        }
    }
}

/// Parses a role name.
///
/// # Errors
///
/// Returns `MembershipError::InvalidRole` for anything but admin or member.
pub fn parse_role(role: &str) -> Result<Role, MembershipError> {
    Role::parse(role).ok_or_else(|| MembershipError::InvalidRole(role.to_string()))
}

/// Membership operations on behalf of a caller.
pub struct MemberManager<M> {
    memberships: M,
}

impl<M: MembershipStore> MemberManager<M> {
    /// Creates a manager over the membership store.
    pub const fn new(memberships: M) -> Self {
        Self { memberships }
    }

    async fn authorize(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        required_role: Option<Role>,
    ) -> Result<(), MembershipError> {
        let membership = self.memberships.get_membership(caller).await?;
        AuthorizationGuard::authorize(membership.as_ref(), organization_id, required_role)
            .into_result()?;
        Ok(())
    }

    async fn authorize_change(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        target: UserId,
        change: MemberChange,
    ) -> Result<(), MembershipError> {
        let membership = self.memberships.get_membership(caller).await?;
        AuthorizationGuard::authorize_member_change(
            caller,
            membership.as_ref(),
            organization_id,
            target,
            change,
        )
        .into_result()?;
        Ok(())
    }

    async fn load_target(
        &self,
        organization_id: OrganizationId,
        target: UserId,
    ) -> Result<Member, MembershipError> {
        self.memberships
            .find_member(target)
            .await?
            .filter(|member| member.belongs_to(organization_id))
            .ok_or(MembershipError::UserNotFound)
    }

    /// Lists the organization's members. Any active member may list.
    ///
    /// # Errors
    ///
    /// `Denied` if the caller is not an active member of `organization_id`.
    pub async fn list(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<Member>, MembershipError> {
        self.authorize(caller, organization_id, None).await?;
        Ok(self.memberships.list_members(organization_id).await?)
    }

    /// Adds an existing, un-onboarded user found by email. Admin only.
    ///
    /// # Errors
    ///
    /// - `Denied` unless the caller is an active admin of `organization_id`
    /// - `UserNotFound` if no user has this email
    /// - `InactiveUser` if that user is deactivated
    /// - `AlreadyMember` if that user already has an organization
    pub async fn add(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        email: &str,
        role: Role,
    ) -> Result<Member, MembershipError> {
        self.authorize(caller, organization_id, Some(Role::Admin))
            .await?;

        let invitee = self
            .memberships
            .find_member_by_email(email.trim())
            .await?
            .ok_or(MembershipError::UserNotFound)?;

        if !invitee.active {
            return Err(MembershipError::InactiveUser);
        }
        if invitee.organization_id.is_some() {
            return Err(MembershipError::AlreadyMember);
        }

        self.memberships
            .assign(invitee.user_id, organization_id, role)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => MembershipError::AlreadyMember,
                other => MembershipError::Store(other),
            })?;

        info!(
            org_id = %organization_id,
            user_id = %invitee.user_id,
            %role,
            added_by = %caller,
            "Member added"
        );

        Ok(Member {
            organization_id: Some(organization_id),
            role,
            ..invitee
        })
    }

    /// Removes a member. Admin only; never the caller themselves.
    ///
    /// # Errors
    ///
    /// - `Denied` for non-admins and for self-removal
    /// - `UserNotFound` if the target is not in `organization_id`
    pub async fn remove(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        target: UserId,
    ) -> Result<(), MembershipError> {
        self.authorize_change(caller, organization_id, target, MemberChange::Remove)
            .await?;
        self.load_target(organization_id, target).await?;

        self.memberships.clear(target, organization_id).await?;

        info!(
            org_id = %organization_id,
            user_id = %target,
            removed_by = %caller,
            "Member removed"
        );
        Ok(())
    }

    /// Changes a member's role and/or active flag. Admin only; an admin
    /// cannot demote or deactivate themselves.
    ///
    /// # Errors
    ///
    /// - `EmptyUpdate` if neither field is given
    /// - `Denied` for non-admins and for self-demotion or self-deactivation
    /// - `UserNotFound` if the target is not in `organization_id`
    pub async fn update(
        &self,
        caller: UserId,
        organization_id: OrganizationId,
        target: UserId,
        role: Option<Role>,
        active: Option<bool>,
    ) -> Result<Member, MembershipError> {
        if role.is_none() && active.is_none() {
            return Err(MembershipError::EmptyUpdate);
        }

        if let Some(role) = role {
            self.authorize_change(caller, organization_id, target, MemberChange::ChangeRole(role))
                .await?;
        }
        if let Some(active) = active {
            self.authorize_change(caller, organization_id, target, MemberChange::SetActive(active))
                .await?;
        }

        let mut member = self.load_target(organization_id, target).await?;

        if let Some(role) = role {
            self.memberships
                .set_role(target, organization_id, role)
                .await?;
            member.role = role;
        }
        if let Some(active) = active {
            self.memberships
                .set_active(target, organization_id, active)
                .await?;
            member.active = active;
        }

        info!(
            org_id = %organization_id,
            user_id = %target,
            role = %member.role,
            active = member.active,
            updated_by = %caller,
            "Member updated"
        );

        Ok(member)
    }
}
