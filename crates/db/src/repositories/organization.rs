//! Organization repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use fieldops_core::store::{OrganizationStore, StoreError};
use fieldops_core::tenancy::{NewOrganization, Organization};
use fieldops_shared::types::OrganizationId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::organizations;
use crate::error::store_error;

impl From<organizations::Model> for Organization {
    fn from(model: organizations::Model) -> Self {
        Self {
            id: OrganizationId::from_uuid(model.id),
            name: model.name,
            slug: model.slug,
            timezone: model.timezone,
            active: model.is_active,
            onboarding_completo: model.onboarding_completo,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Inserts an active organization with onboarding pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails (including a slug collision).
    pub async fn create(&self, new: &NewOrganization) -> Result<organizations::Model, DbErr> {
        let now = Utc::now().into();
        let org = organizations::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(new.name.trim().to_string()),
            slug: Set(new.slug.clone()),
            timezone: Set(new.timezone.clone()),
            is_active: Set(true),
            onboarding_completo: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        org.insert(&self.db).await
    }

    /// Updates name and/or timezone. The slug never changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        timezone: Option<String>,
    ) -> Result<Option<organizations::Model>, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut active: organizations::ActiveModel = org.into();
        if let Some(name) = name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(timezone) = timezone {
            active.timezone = Set(timezone);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }

    /// Marks onboarding complete. Completing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn complete_onboarding(
        &self,
        id: Uuid,
    ) -> Result<Option<organizations::Model>, DbErr> {
        let Some(org) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        if org.onboarding_completo {
            return Ok(Some(org));
        }

        let mut active: organizations::ActiveModel = org.into();
        active.onboarding_completo = Set(true);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map(Some)
    }
}

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn find_organization(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError> {
        self.find_by_id(id.into_inner())
            .await
            .map(|org| org.map(Organization::from))
            .map_err(store_error)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        Self::slug_exists(self, slug).await.map_err(store_error)
    }

    async fn insert_organization(
        &self,
        new: &NewOrganization,
    ) -> Result<Organization, StoreError> {
        self.create(new)
            .await
            .map(Organization::from)
            .map_err(store_error)
    }

    async fn delete_organization(&self, id: OrganizationId) -> Result<(), StoreError> {
        organizations::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map(|_| ())
            .map_err(store_error)
    }

    async fn active_organization_ids(&self) -> Result<Vec<OrganizationId>, StoreError> {
        organizations::Entity::find()
            .select_only()
            .column(organizations::Column::Id)
            .filter(organizations::Column::IsActive.eq(true))
            .order_by_asc(organizations::Column::CreatedAt)
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map(|ids| ids.into_iter().map(OrganizationId::from_uuid).collect())
            .map_err(store_error)
    }
}
