//! Technician repository.

use chrono::Utc;
use fieldops_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::technicians;

/// Input for creating a technician.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTechnicianInput {
    /// Full name.
    pub full_name: String,
    /// Nickname shown on the calendar.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Technician repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TechnicianRepository {
    db: DatabaseConnection,
}

impl TechnicianRepository {
    /// Creates a new technician repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a technician in `organization_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        organization_id: Uuid,
        input: CreateTechnicianInput,
    ) -> Result<technicians::Model, DbErr> {
        let now = Utc::now().into();
        let technician = technicians::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id),
            full_name: Set(input.full_name.trim().to_string()),
            nickname: Set(input
                .nickname
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())),
            phone: Set(input.phone),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        technician.insert(&self.db).await
    }

    /// Lists the technicians of an organization by full name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<technicians::Model>, DbErr> {
        let paginator = technicians::Entity::find()
            .filter(technicians::Column::OrganizationId.eq(organization_id))
            .order_by_asc(technicians::Column::FullName)
            .paginate(&self.db, u64::from(page.page_size()));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// True if a technician with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn exists(&self, id: Uuid) -> Result<bool, DbErr> {
        let count = technicians::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }
}
