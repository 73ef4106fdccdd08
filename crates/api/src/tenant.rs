//! Per-request tenant access for handlers.

use fieldops_core::tenancy::{Access, Role, Scope, TenantAccess};
use fieldops_shared::types::OrganizationId;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Looks up the caller's membership and authorizes it for `org_id`.
pub(crate) async fn require(
    state: &AppState,
    auth: &AuthUser,
    org_id: Uuid,
    required_role: Option<Role>,
    scope: Scope,
) -> ApiResult<Access> {
    let access = TenantAccess::new(state.users(), state.organizations())
        .check(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            required_role,
            scope,
        )
        .await?;
    Ok(access)
}
