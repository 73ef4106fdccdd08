//! Tenant isolation and organization lifecycle.
//!
//! # Modules
//!
//! - `types` - Roles, membership tuples, organizations
//! - `guard` - Pure authorization decisions
//! - `access` - Per-request membership lookup, guard and gate
//! - `provision` - Organization creation with compensation
//! - `members` - Invite, remove, role and activation changes

pub mod access;
pub mod guard;
pub mod members;
pub mod provision;
pub mod types;

#[cfg(test)]
mod guard_props;

pub use access::{Access, AccessError, Scope, TenantAccess};
pub use guard::{AuthorizationGuard, Decision, DenyReason, MemberChange};
pub use members::{MemberManager, MembershipError, parse_role};
pub use provision::{
    OrganizationProvisioner, ProvisionError, validate_name, validate_slug, validate_timezone,
};
pub use types::{Member, Membership, NewOrganization, Organization, Role};
