//! User repository: profiles and membership tuples.

use async_trait::async_trait;
use chrono::Utc;
use fieldops_core::store::{MembershipStore, StoreError};
use fieldops_core::tenancy::{Member, Membership, Role};
use fieldops_shared::types::{OrganizationId, UserId};
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::UserRole, users};
use crate::error::store_error;

impl From<users::Model> for Member {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: UserId::from_uuid(model.id),
            display_name: model.display_name,
            email: model.email,
            phone: model.phone,
            organization_id: model.organization_id.map(OrganizationId::from_uuid),
            role: model.role.into(),
            active: model.is_active,
        }
    }
}

/// Profile fields written by `PUT /me`.
#[derive(Debug, Clone)]
pub struct ProfileInput {
    /// Display name.
    pub display_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((users::Entity, users::Column::Email))))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
    }

    /// Creates or updates the profile of the resolved identity. Membership
    /// columns are left untouched on update.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails (e.g. the email is taken).
    pub async fn upsert_profile(
        &self,
        id: Uuid,
        profile: ProfileInput,
    ) -> Result<users::Model, DbErr> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(id),
            display_name: Set(profile.display_name),
            email: Set(Some(profile.email)),
            phone: Set(profile.phone),
            organization_id: Set(None),
            role: Set(UserRole::Member),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        users::Entity::insert(user)
            .on_conflict(
                OnConflict::column(users::Column::Id)
                    .update_columns([
                        users::Column::DisplayName,
                        users::Column::Email,
                        users::Column::Phone,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("user {id}")))
    }

    /// Lists the users of an organization ordered by display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::OrganizationId.eq(organization_id))
            .order_by_asc(users::Column::DisplayName)
            .all(&self.db)
            .await
    }

    /// Sets membership columns on a user, but only while the user has no
    /// organization. `is_active` is left untouched. Returns the number of
    /// rows changed.
    async fn attach(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<u64, DbErr> {
        let changes = users::ActiveModel {
            organization_id: Set(Some(organization_id.into_inner())),
            role: Set(role.into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let result = users::Entity::update_many()
            .set(changes)
            .filter(users::Column::Id.eq(user_id.into_inner()))
            .filter(users::Column::OrganizationId.is_null())
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Explains why `attach` changed nothing.
    async fn attach_failure(&self, user_id: UserId) -> StoreError {
        match self.find_by_id(user_id.into_inner()).await {
            Ok(Some(_)) => StoreError::Conflict(format!(
                "user {user_id} already belongs to an organization"
            )),
            Ok(None) => StoreError::NotFound(format!("user {user_id}")),
            Err(e) => store_error(e),
        }
    }

    /// Applies `changes` to a user of `organization_id`.
    async fn update_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        changes: users::ActiveModel,
    ) -> Result<(), StoreError> {
        let result = users::Entity::update_many()
            .set(changes)
            .filter(users::Column::Id.eq(user_id.into_inner()))
            .filter(users::Column::OrganizationId.eq(organization_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for UserRepository {
    async fn get_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError> {
        let user = self
            .find_by_id(user_id.into_inner())
            .await
            .map_err(store_error)?;
        Ok(user.map(Member::from).and_then(|m| m.membership()))
    }

    async fn promote_to_admin(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), StoreError> {
        let changed = self
            .attach(user_id, organization_id, Role::Admin)
            .await
            .map_err(store_error)?;
        if changed == 0 {
            return Err(self.attach_failure(user_id).await);
        }
        Ok(())
    }

    async fn find_member(&self, user_id: UserId) -> Result<Option<Member>, StoreError> {
        self.find_by_id(user_id.into_inner())
            .await
            .map(|user| user.map(Member::from))
            .map_err(store_error)
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        self.find_by_email(email)
            .await
            .map(|user| user.map(Member::from))
            .map_err(store_error)
    }

    async fn assign(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError> {
        let changed = self
            .attach(user_id, organization_id, role)
            .await
            .map_err(store_error)?;
        if changed == 0 {
            return Err(self.attach_failure(user_id).await);
        }
        Ok(())
    }

    async fn clear(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), StoreError> {
        let changes = users::ActiveModel {
            organization_id: Set(None),
            role: Set(UserRole::Member),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.update_member(user_id, organization_id, changes).await
    }

    async fn set_role(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        role: Role,
    ) -> Result<(), StoreError> {
        let changes = users::ActiveModel {
            role: Set(role.into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.update_member(user_id, organization_id, changes).await
    }

    async fn set_active(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
        active: bool,
    ) -> Result<(), StoreError> {
        let changes = users::ActiveModel {
            is_active: Set(active),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        self.update_member(user_id, organization_id, changes).await
    }

    async fn list_members(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Member>, StoreError> {
        self.list_by_organization(organization_id.into_inner())
            .await
            .map(|users| users.into_iter().map(Member::from).collect())
            .map_err(store_error)
    }
}
