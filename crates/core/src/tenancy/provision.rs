//! Organization creation with its creator promoted to admin.
//!
//! The two writes go to different rows and are not wrapped in a store
//! transaction. If the promotion fails after the organization row exists,
//! the row is deleted again before the error is returned, so no
//! organization is ever left without an admin.

use chrono_tz::Tz;
use fieldops_shared::AppError;
use fieldops_shared::types::UserId;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::store::{MembershipStore, OrganizationStore, StoreError};
use crate::tenancy::types::{NewOrganization, Organization};

const SLUG_MIN_LEN: usize = 3;
const SLUG_MAX_LEN: usize = 63;

/// Errors from organization provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Malformed input.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The creator already belongs to an organization.
    #[error("user already belongs to an organization")]
    AlreadyMember,

    /// The creator was deactivated and cannot own an organization.
    #[error("inactive users cannot create an organization")]
    InactiveUser,

    /// Another organization uses this slug.
    #[error("slug `{0}` is already taken")]
    SlugTaken(String),

    /// A store call failed; any partial write was compensated.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ProvisionError> for AppError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Invalid { field, reason } => Self::validation(field, reason),
            ProvisionError::AlreadyMember | ProvisionError::SlugTaken(_) => {
                Self::Conflict(err.to_string())
            }
            ProvisionError::InactiveUser => Self::BusinessRule(err.to_string()),
            ProvisionError::Store(e) => e.into(),
        }
    }
}

/// Validates a slug: lowercase ASCII letters, digits and inner hyphens.
///
/// # Errors
///
/// Returns `ProvisionError::Invalid` describing the first problem found.
pub fn validate_slug(slug: &str) -> Result<(), ProvisionError> {
    let invalid = |reason: &str| ProvisionError::Invalid {
        field: "slug",
        reason: reason.to_string(),
    };

    if !(SLUG_MIN_LEN..=SLUG_MAX_LEN).contains(&slug.len()) {
        return Err(invalid("must be between 3 and 63 characters"));
    }
    if !slug
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(invalid(
            "only lowercase letters, digits and hyphens are allowed",
        ));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(invalid("must not start or end with a hyphen"));
    }
    Ok(())
}

/// Validates an IANA timezone name.
///
/// # Errors
///
/// Returns `ProvisionError::Invalid` for unknown zones.
pub fn validate_timezone(timezone: &str) -> Result<Tz, ProvisionError> {
    timezone.parse::<Tz>().map_err(|_| ProvisionError::Invalid {
        field: "timezone",
        reason: format!("unknown timezone `{timezone}`"),
    })
}

/// Validates a display name.
///
/// # Errors
///
/// Returns `ProvisionError::Invalid` when blank.
pub fn validate_name(name: &str) -> Result<(), ProvisionError> {
    if name.trim().is_empty() {
        return Err(ProvisionError::Invalid {
            field: "name",
            reason: "must not be blank".to_string(),
        });
    }
    Ok(())
}

/// Creates organizations and promotes their creator.
pub struct OrganizationProvisioner<O, M> {
    organizations: O,
    memberships: M,
}

impl<O, M> OrganizationProvisioner<O, M>
where
    O: OrganizationStore,
    M: MembershipStore,
{
    /// Creates a provisioner over the given stores.
    pub const fn new(organizations: O, memberships: M) -> Self {
        Self {
            organizations,
            memberships,
        }
    }

    /// Creates `new` and makes `creator` its sole admin.
    ///
    /// # Errors
    ///
    /// - `Invalid` for a blank name, malformed slug or unknown timezone
    /// - `AlreadyMember` if the creator already has an organization
    /// - `InactiveUser` if the creator was deactivated
    /// - `SlugTaken` if the slug is in use
    /// - `Store` if a write failed (the organization row is removed again)
    pub async fn provision(
        &self,
        creator: UserId,
        new: NewOrganization,
    ) -> Result<Organization, ProvisionError> {
        validate_name(&new.name)?;
        validate_slug(&new.slug)?;
        validate_timezone(&new.timezone)?;

        let member = self
            .memberships
            .find_member(creator)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {creator}")))?;
        if !member.active {
            return Err(ProvisionError::InactiveUser);
        }
        if member.organization_id.is_some() {
            return Err(ProvisionError::AlreadyMember);
        }

        if self.organizations.slug_exists(&new.slug).await? {
            return Err(ProvisionError::SlugTaken(new.slug));
        }

        let organization = self.organizations.insert_organization(&new).await?;

        if let Err(promotion_err) = self
            .memberships
            .promote_to_admin(creator, organization.id)
            .await
        {
            warn!(
                org_id = %organization.id,
                user_id = %creator,
                error = %promotion_err,
                "Admin promotion failed, deleting organization"
            );

            if let Err(cleanup_err) = self.organizations.delete_organization(organization.id).await
            {
                error!(
                    org_id = %organization.id,
                    error = %cleanup_err,
                    "Compensating delete failed, organization left without admin"
                );
            }

            return Err(match promotion_err {
                StoreError::Conflict(_) => ProvisionError::AlreadyMember,
                other => ProvisionError::Store(other),
            });
        }

        info!(
            org_id = %organization.id,
            slug = %organization.slug,
            admin_id = %creator,
            "Organization created"
        );

        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;
    use crate::tenancy::types::Role;
    use rstest::rstest;

    fn new_org(slug: &str) -> NewOrganization {
        NewOrganization {
            name: "Acme Refrigeração".to_string(),
            slug: slug.to_string(),
            timezone: "America/Sao_Paulo".to_string(),
        }
    }

    #[rstest]
    #[case("acme", true)]
    #[case("acme-field-ops", true)]
    #[case("a1b2", true)]
    #[case("ab", false)]
    #[case("Acme", false)]
    #[case("acme_ops", false)]
    #[case("-acme", false)]
    #[case("acme-", false)]
    fn test_validate_slug(#[case] slug: &str, #[case] ok: bool) {
        assert_eq!(validate_slug(slug).is_ok(), ok);
    }

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("America/Sao_Paulo").is_ok());
        assert!(matches!(
            validate_timezone("Nowhere/Land"),
            Err(ProvisionError::Invalid { field: "timezone", .. })
        ));
    }

    #[tokio::test]
    async fn test_provision_promotes_creator() {
        let store = InMemoryStore::default();
        let creator = store.add_user();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());

        let org = provisioner.provision(creator, new_org("acme")).await.unwrap();

        assert!(org.active);
        assert!(!org.onboarding_completo);
        let membership = store.get_membership(creator).await.unwrap().unwrap();
        assert_eq!(membership.organization_id, org.id);
        assert_eq!(membership.role, Role::Admin);
        assert!(membership.active);
    }

    #[tokio::test]
    async fn test_provision_compensates_failed_promotion() {
        let store = InMemoryStore::default();
        let creator = store.add_user();
        store.fail_promotions();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());

        let result = provisioner.provision(creator, new_org("acme")).await;

        assert!(matches!(result, Err(ProvisionError::Store(_))));
        assert_eq!(store.organization_count(), 0);
        assert!(store.get_membership(creator).await.unwrap().is_none());
        assert!(!store.slug_exists("acme").await.unwrap());
    }

    #[tokio::test]
    async fn test_provision_unknown_user_leaves_no_organization() {
        let store = InMemoryStore::default();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());

        let result = provisioner.provision(UserId::new(), new_org("ghost")).await;

        assert!(matches!(
            result,
            Err(ProvisionError::Store(StoreError::NotFound(_)))
        ));
        assert_eq!(store.organization_count(), 0);
    }

    #[tokio::test]
    async fn test_provision_rejects_existing_member() {
        let store = InMemoryStore::default();
        let creator = store.add_user();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());
        provisioner.provision(creator, new_org("first")).await.unwrap();

        let result = provisioner.provision(creator, new_org("second")).await;

        assert!(matches!(result, Err(ProvisionError::AlreadyMember)));
        assert_eq!(store.organization_count(), 1);
    }

    #[tokio::test]
    async fn test_provision_rejects_removed_inactive_user() {
        let store = InMemoryStore::default();
        let admin = store.add_user();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());
        let first = provisioner.provision(admin, new_org("first")).await.unwrap();
        let former = store.add_member(first.id, Role::Member);
        store.set_active(former, first.id, false).await.unwrap();
        store.clear(former, first.id).await.unwrap();

        let err = provisioner
            .provision(former, new_org("second"))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InactiveUser));
        assert_eq!(store.organization_count(), 1);
        let member = store.member(former).unwrap();
        assert!(!member.active);
        assert_eq!(member.organization_id, None);
        assert_eq!(member.role, Role::Member);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 422);
    }

    #[tokio::test]
    async fn test_provision_rejects_taken_slug() {
        let store = InMemoryStore::default();
        let first = store.add_user();
        let second = store.add_user();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());
        provisioner.provision(first, new_org("acme")).await.unwrap();

        let result = provisioner.provision(second, new_org("acme")).await;

        assert!(matches!(result, Err(ProvisionError::SlugTaken(slug)) if slug == "acme"));
        assert!(store.get_membership(second).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_provision_validates_before_writing() {
        let store = InMemoryStore::default();
        let creator = store.add_user();
        let provisioner = OrganizationProvisioner::new(store.clone(), store.clone());

        let mut input = new_org("acme");
        input.name = "   ".to_string();
        let err = provisioner.provision(creator, input).await.unwrap_err();

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(store.organization_count(), 0);
    }
}
