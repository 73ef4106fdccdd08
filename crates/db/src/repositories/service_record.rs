//! Service record repository.
//!
//! Every query is filtered on `organization_id`; a record stamped with
//! another organization is indistinguishable from a missing one.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fieldops_core::calendar::{MonthRange, ServiceProjection};
use fieldops_core::lifecycle::Repair;
use fieldops_core::service::{
    NewServiceRecord, PaymentStatus as DomainPaymentStatus, ServiceRecord, ServiceRecordChanges,
    ServiceStatus as DomainServiceStatus,
};
use fieldops_core::store::{ProjectionStore, ReferenceStore, ServiceRecordStore, StoreError};
use fieldops_shared::types::{
    Amount, ClientId, OrganizationId, PageRequest, PageResponse, ServiceRecordId, TechnicianId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    JoinType, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
    Set,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::{PaymentStatus, ServiceStatus};
use crate::entities::{clients, service_records, technicians};
use crate::error::store_error;
use crate::repositories::{ClientRepository, TechnicianRepository};

impl TryFrom<service_records::Model> for ServiceRecord {
    type Error = StoreError;

    fn try_from(model: service_records::Model) -> Result<Self, Self::Error> {
        let gross_value = Amount::new(model.gross_value).map_err(|e| {
            StoreError::Backend(format!("service record {}: {e}", model.id))
        })?;

        Ok(Self {
            id: ServiceRecordId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            client_id: ClientId::from_uuid(model.client_id),
            technician_id: TechnicianId::from_uuid(model.technician_id),
            date: model.date,
            gross_value,
            status: model.status.into(),
            payment_status: model.payment_status.into(),
            payment_date: model.payment_date.map(|d| d.with_timezone(&Utc)),
            completed_date: model.completed_date.map(|d| d.with_timezone(&Utc)),
            has_invoice: model.has_invoice,
            description: model.description,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}

/// Optional filters for listing service records.
#[derive(Debug, Clone, Default)]
pub struct ServiceRecordFilter {
    /// Fulfillment status.
    pub status: Option<DomainServiceStatus>,
    /// Payment status.
    pub payment_status: Option<DomainPaymentStatus>,
    /// Client.
    pub client_id: Option<Uuid>,
    /// Technician.
    pub technician_id: Option<Uuid>,
    /// First day, inclusive.
    pub from: Option<NaiveDate>,
    /// Last day, inclusive.
    pub to: Option<NaiveDate>,
}

#[derive(Debug, FromQueryResult)]
struct ProjectionRow {
    id: Uuid,
    date: NaiveDate,
    gross_value: Decimal,
    has_invoice: bool,
    status: ServiceStatus,
    payment_status: PaymentStatus,
    client_name: String,
    technician_full_name: String,
    technician_nickname: Option<String>,
}

impl TryFrom<ProjectionRow> for ServiceProjection {
    type Error = StoreError;

    fn try_from(row: ProjectionRow) -> Result<Self, Self::Error> {
        let gross_value = Amount::new(row.gross_value)
            .map_err(|e| StoreError::Backend(format!("service record {}: {e}", row.id)))?;

        Ok(Self {
            id: ServiceRecordId::from_uuid(row.id),
            date: row.date,
            gross_value,
            has_invoice: row.has_invoice,
            status: row.status.into(),
            payment_status: row.payment_status.into(),
            client_name: row.client_name,
            technician_full_name: row.technician_full_name,
            technician_nickname: row.technician_nickname,
        })
    }
}

/// Service record repository.
#[derive(Debug, Clone)]
pub struct ServiceRecordRepository {
    db: DatabaseConnection,
}

impl ServiceRecordRepository {
    /// Creates a new service record repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a validated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert(&self, record: &NewServiceRecord) -> Result<service_records::Model, DbErr> {
        let now = Utc::now().into();
        let model = service_records::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(record.organization_id.into_inner()),
            client_id: Set(record.client_id.into_inner()),
            technician_id: Set(record.technician_id.into_inner()),
            date: Set(record.date),
            gross_value: Set(record.gross_value.value()),
            status: Set(record.status.into()),
            payment_status: Set(record.payment_status.into()),
            payment_date: Set(record.payment_date.map(Into::into)),
            completed_date: Set(None),
            has_invoice: Set(record.has_invoice),
            description: Set(record.description.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await
    }

    /// Finds a record by ID within an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<service_records::Model>, DbErr> {
        service_records::Entity::find_by_id(id)
            .filter(service_records::Column::OrganizationId.eq(organization_id))
            .one(&self.db)
            .await
    }

    /// Applies a partial update to a record of `organization_id`.
    ///
    /// Returns `None` when no record with that ID exists in the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        changes: &ServiceRecordChanges,
    ) -> Result<Option<service_records::Model>, DbErr> {
        let result = service_records::Entity::update_many()
            .set(changes_to_active_model(changes))
            .filter(service_records::Column::Id.eq(id))
            .filter(service_records::Column::OrganizationId.eq(organization_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(organization_id, id).await
    }

    /// Lists records of an organization, newest day first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: &ServiceRecordFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<service_records::Model>, DbErr> {
        let paginator = list_query(organization_id, filter)
            .order_by_desc(service_records::Column::Date)
            .order_by_desc(service_records::Column::CreatedAt)
            .paginate(&self.db, u64::from(page.page_size()));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.page_index()).await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Records of an organization matching the drift predicate for `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_drifted(
        &self,
        organization_id: Uuid,
        today: NaiveDate,
    ) -> Result<Vec<service_records::Model>, DbErr> {
        drift_query(organization_id, today)
            .order_by_asc(service_records::Column::Date)
            .all(&self.db)
            .await
    }

    /// Closes a drifted record, only if it is still paid, open and without
    /// a completion instant. Returns `true` when a row changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn repair(&self, repair: &Repair) -> Result<bool, DbErr> {
        let result = service_records::Entity::update_many()
            .set(service_records::ActiveModel {
                status: Set(Repair::STATUS.into()),
                completed_date: Set(Some(repair.completed_date.into())),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(repair_condition(repair))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Records of an organization dated inside `range`, with client and
    /// technician names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    async fn projection_rows(
        &self,
        organization_id: Uuid,
        range: MonthRange,
    ) -> Result<Vec<ProjectionRow>, DbErr> {
        projection_query(organization_id, range)
            .into_model::<ProjectionRow>()
            .all(&self.db)
            .await
    }
}

fn changes_to_active_model(changes: &ServiceRecordChanges) -> service_records::ActiveModel {
    fn set_or_skip<V: Into<sea_orm::Value>>(value: Option<V>) -> sea_orm::ActiveValue<V> {
        value.map_or(NotSet, Set)
    }

    service_records::ActiveModel {
        client_id: set_or_skip(changes.client_id.map(ClientId::into_inner)),
        technician_id: set_or_skip(changes.technician_id.map(TechnicianId::into_inner)),
        date: set_or_skip(changes.date),
        gross_value: set_or_skip(changes.gross_value.map(Amount::value)),
        status: set_or_skip(changes.status.map(ServiceStatus::from)),
        payment_status: set_or_skip(changes.payment_status.map(PaymentStatus::from)),
        payment_date: set_or_skip(
            changes
                .payment_date
                .map(|d| d.map(DateTime::<FixedOffset>::from)),
        ),
        completed_date: set_or_skip(
            changes
                .completed_date
                .map(|d| d.map(DateTime::<FixedOffset>::from)),
        ),
        has_invoice: set_or_skip(changes.has_invoice),
        description: set_or_skip(changes.description.clone()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

fn list_query(organization_id: Uuid, filter: &ServiceRecordFilter) -> Select<service_records::Entity> {
    let mut query = service_records::Entity::find()
        .filter(service_records::Column::OrganizationId.eq(organization_id));

    if let Some(status) = filter.status {
        query = query.filter(service_records::Column::Status.eq(ServiceStatus::from(status)));
    }
    if let Some(payment_status) = filter.payment_status {
        query = query.filter(
            service_records::Column::PaymentStatus.eq(PaymentStatus::from(payment_status)),
        );
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(service_records::Column::ClientId.eq(client_id));
    }
    if let Some(technician_id) = filter.technician_id {
        query = query.filter(service_records::Column::TechnicianId.eq(technician_id));
    }
    if let Some(from) = filter.from {
        query = query.filter(service_records::Column::Date.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(service_records::Column::Date.lte(to));
    }

    query
}

fn open_statuses() -> [ServiceStatus; 2] {
    [ServiceStatus::Pendente, ServiceStatus::EmAndamento]
}

fn drift_query(organization_id: Uuid, today: NaiveDate) -> Select<service_records::Entity> {
    service_records::Entity::find()
        .filter(service_records::Column::OrganizationId.eq(organization_id))
        .filter(service_records::Column::PaymentStatus.eq(PaymentStatus::Pago))
        .filter(service_records::Column::Status.is_in(open_statuses()))
        .filter(service_records::Column::Date.lt(today))
        .filter(service_records::Column::CompletedDate.is_null())
}

fn repair_condition(repair: &Repair) -> Condition {
    Condition::all()
        .add(service_records::Column::Id.eq(repair.record_id.into_inner()))
        .add(service_records::Column::OrganizationId.eq(repair.organization_id.into_inner()))
        .add(service_records::Column::PaymentStatus.eq(PaymentStatus::Pago))
        .add(service_records::Column::Status.is_in(open_statuses()))
        .add(service_records::Column::CompletedDate.is_null())
}

fn projection_query(organization_id: Uuid, range: MonthRange) -> Select<service_records::Entity> {
    service_records::Entity::find()
        .filter(service_records::Column::OrganizationId.eq(organization_id))
        .filter(service_records::Column::Date.gte(range.start))
        .filter(service_records::Column::Date.lt(range.end))
        .join(
            JoinType::InnerJoin,
            service_records::Relation::Clients.def(),
        )
        .join(
            JoinType::InnerJoin,
            service_records::Relation::Technicians.def(),
        )
        .column_as(clients::Column::Name, "client_name")
        .column_as(technicians::Column::FullName, "technician_full_name")
        .column_as(technicians::Column::Nickname, "technician_nickname")
        .order_by_asc(service_records::Column::Date)
        .order_by_asc(service_records::Column::CreatedAt)
}

#[async_trait]
impl ServiceRecordStore for ServiceRecordRepository {
    async fn insert_record(&self, record: &NewServiceRecord) -> Result<ServiceRecord, StoreError> {
        self.insert(record).await.map_err(store_error)?.try_into()
    }

    async fn find_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
    ) -> Result<Option<ServiceRecord>, StoreError> {
        self.find(organization_id.into_inner(), id.into_inner())
            .await
            .map_err(store_error)?
            .map(ServiceRecord::try_from)
            .transpose()
    }

    async fn update_record(
        &self,
        organization_id: OrganizationId,
        id: ServiceRecordId,
        changes: &ServiceRecordChanges,
    ) -> Result<Option<ServiceRecord>, StoreError> {
        self.update(organization_id.into_inner(), id.into_inner(), changes)
            .await
            .map_err(store_error)?
            .map(ServiceRecord::try_from)
            .transpose()
    }

    async fn drift_candidates(
        &self,
        organization_id: OrganizationId,
        today: NaiveDate,
    ) -> Result<Vec<ServiceRecord>, StoreError> {
        self.find_drifted(organization_id.into_inner(), today)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ServiceRecord::try_from)
            .collect()
    }

    async fn apply_repair(&self, repair: &Repair) -> Result<bool, StoreError> {
        self.repair(repair).await.map_err(store_error)
    }
}

#[async_trait]
impl ReferenceStore for ServiceRecordRepository {
    async fn client_exists(&self, id: ClientId) -> Result<bool, StoreError> {
        ClientRepository::new(self.db.clone())
            .exists(id.into_inner())
            .await
            .map_err(store_error)
    }

    async fn technician_exists(&self, id: TechnicianId) -> Result<bool, StoreError> {
        TechnicianRepository::new(self.db.clone())
            .exists(id.into_inner())
            .await
            .map_err(store_error)
    }
}

#[async_trait]
impl ProjectionStore for ServiceRecordRepository {
    async fn month_projection(
        &self,
        organization_id: OrganizationId,
        range: MonthRange,
    ) -> Result<Vec<ServiceProjection>, StoreError> {
        self.projection_rows(organization_id.into_inner(), range)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ServiceProjection::try_from)
            .collect()
    }
}
