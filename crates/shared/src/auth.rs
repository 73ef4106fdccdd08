//! Caller identity claims and tenancy request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by identity-provider access tokens.
///
/// Only the subject is trusted. Organization and role are never read from
/// the token; they are looked up in the membership store on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: Uuid,
    /// Email known to the identity provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, email: Option<String>, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Create organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    pub name: String,
    /// Organization slug (URL-friendly, globally unique).
    pub slug: String,
    /// Timezone (IANA format) used as the organization's calendar.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

/// Update organization request. The slug is immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationRequest {
    /// Organization name (optional).
    pub name: Option<String>,
    /// Timezone (optional, IANA format).
    pub timezone: Option<String>,
}

/// Invite an existing user into the caller's organization.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMemberRequest {
    /// Email of the user to add.
    pub email: String,
    /// Role to assign (`admin` or `member`).
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

/// Update organization member request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRequest {
    /// New role (optional).
    pub role: Option<String>,
    /// Activate or deactivate the member (optional).
    pub active: Option<bool>,
}

/// Profile upsert for the resolved caller.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProfileRequest {
    /// Display name.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
}
