//! Client repository.

use chrono::Utc;
use fieldops_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::clients;

/// Input for creating a client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClientInput {
    /// Client name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Client repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a client in `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: CreateClientInput,
    ) -> Result<clients::Model, DbErr> {
        let now = Utc::now().into();
        let client = clients::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        client.insert(&self.db).await
    }

    /// Lists the clients of an organization by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<clients::Model>, DbErr> {
        let paginator = clients::Entity::find()
            .filter(clients::Column::OrganizationId.eq(organization_id))
            .order_by_asc(clients::Column::Name)
            .paginate(&self.db, u64::from(page.page_size()));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// True if a client with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, id: Uuid) -> Result<bool, DbErr> {
        let count = clients::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }
}
