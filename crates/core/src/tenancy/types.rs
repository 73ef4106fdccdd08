//! Tenancy domain types.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use fieldops_shared::types::{OrganizationId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user inside their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages settings and members.
    Admin,
    /// Works with clients, technicians and service records.
    Member,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `(organization_id, role, active)` tuple held for an onboarded user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Membership {
    /// The only organization this user belongs to.
    pub organization_id: OrganizationId,
    /// Role inside that organization.
    pub role: Role,
    /// False once the user was deactivated.
    pub active: bool,
}

/// A user as seen by membership management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// User ID.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Organization, `None` until onboarded.
    pub organization_id: Option<OrganizationId>,
    /// Role inside the organization.
    pub role: Role,
    /// Soft-delete flag.
    pub active: bool,
}

impl Member {
    /// The membership tuple, if the user belongs to an organization.
    #[must_use]
    pub fn membership(&self) -> Option<Membership> {
        self.organization_id.map(|organization_id| Membership {
            organization_id,
            role: self.role,
            active: self.active,
        })
    }

    /// True if this user belongs to `organization_id`.
    #[must_use]
    pub fn belongs_to(&self, organization_id: OrganizationId) -> bool {
        self.organization_id == Some(organization_id)
    }
}

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Organization ID.
    pub id: OrganizationId,
    /// Display name.
    pub name: String,
    /// Globally unique, immutable slug.
    pub slug: String,
    /// IANA timezone of the organization's calendar.
    pub timezone: String,
    /// Inactive organizations lose access to the main application.
    pub active: bool,
    /// Set once onboarding finished; gates the main application.
    pub onboarding_completo: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Parsed timezone, falling back to UTC for unparseable legacy values.
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }
}

/// Input for creating an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    /// Display name.
    pub name: String,
    /// Requested slug.
    pub slug: String,
    /// IANA timezone.
    pub timezone: String,
}
