//! Service record routes and on-demand reconciliation.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use fieldops_core::SystemClock;
use fieldops_core::lifecycle::{ReconciliationEngine, ReconciliationReport};
use fieldops_core::service::{
    CreateServiceRecordInput, PaymentStatus, ServiceRecord, ServiceRecordService, ServiceStatus,
    UpdateServiceRecordInput, parse_calendar_date,
};
use fieldops_core::tenancy::{Role, Scope};
use fieldops_db::{ServiceRecordFilter, store_error};
use fieldops_shared::AppError;
use fieldops_shared::types::{OrganizationId, PageRequest, PageResponse, ServiceRecordId};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser, tenant};

/// Query string for listing records.
#[derive(Debug, Default, Deserialize)]
pub struct ListServiceRecordsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Fulfillment status.
    pub status: Option<String>,
    /// Payment status.
    pub payment_status: Option<String>,
    /// Client.
    pub client_id: Option<Uuid>,
    /// Technician.
    pub technician_id: Option<Uuid>,
    /// First day, inclusive (`YYYY-MM-DD`).
    pub from: Option<String>,
    /// Last day, inclusive (`YYYY-MM-DD`).
    pub to: Option<String>,
}

impl ListServiceRecordsQuery {
    fn page(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }

    fn filter(&self) -> Result<ServiceRecordFilter, AppError> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                ServiceStatus::parse(s)
                    .ok_or_else(|| AppError::validation("status", format!("unknown status `{s}`")))
            })
            .transpose()?;
        let payment_status = self
            .payment_status
            .as_deref()
            .map(|s| {
                PaymentStatus::parse(s).ok_or_else(|| {
                    AppError::validation("payment_status", format!("unknown payment status `{s}`"))
                })
            })
            .transpose()?;
        let from = self
            .from
            .as_deref()
            .map(parse_calendar_date)
            .transpose()
            .map_err(|_| AppError::validation("from", "expected YYYY-MM-DD"))?;
        let to = self
            .to
            .as_deref()
            .map(parse_calendar_date)
            .transpose()
            .map_err(|_| AppError::validation("to", "expected YYYY-MM-DD"))?;

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(AppError::validation("from", "must not be after `to`"));
        }

        Ok(ServiceRecordFilter {
            status,
            payment_status,
            client_id: self.client_id,
            technician_id: self.technician_id,
            from,
            to,
        })
    }
}

/// Creates the service records router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/service-records",
            get(list_records).post(create_record),
        )
        .route(
            "/organizations/{org_id}/service-records/reconcile",
            post(reconcile),
        )
        .route(
            "/organizations/{org_id}/service-records/{id}",
            get(get_record).patch(update_record),
        )
}

fn records(
    state: &AppState,
) -> ServiceRecordService<fieldops_db::ServiceRecordRepository, fieldops_db::ServiceRecordRepository>
{
    let repo = state.service_records();
    ServiceRecordService::new(repo.clone(), repo)
}

/// GET `/organizations/{org_id}/service-records`
async fn list_records(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<ListServiceRecordsQuery>,
) -> ApiResult<Json<PageResponse<ServiceRecord>>> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;
    let filter = query.filter()?;

    let page = state
        .service_records()
        .list(org_id, &filter, &query.page())
        .await
        .map_err(store_error)?;

    let data = page
        .data
        .into_iter()
        .map(ServiceRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(PageResponse {
        data,
        meta: page.meta,
    }))
}

/// POST `/organizations/{org_id}/service-records`
async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateServiceRecordInput>,
) -> ApiResult<(StatusCode, Json<ServiceRecord>)> {
    let access = tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let record = records(&state)
        .create(access.organization.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET `/organizations/{org_id}/service-records/{id}`
async fn get_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ServiceRecord>> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let record = records(&state)
        .get(
            OrganizationId::from_uuid(org_id),
            ServiceRecordId::from_uuid(id),
        )
        .await?;
    Ok(Json(record))
}

/// PATCH `/organizations/{org_id}/service-records/{id}`
async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateServiceRecordInput>,
) -> ApiResult<Json<ServiceRecord>> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let record = records(&state)
        .update(
            OrganizationId::from_uuid(org_id),
            ServiceRecordId::from_uuid(id),
            payload,
        )
        .await?;

    Ok(Json(record))
}

/// POST `/organizations/{org_id}/service-records/reconcile` - Admin only.
async fn reconcile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<ReconciliationReport>> {
    tenant::require(&state, &auth, org_id, Some(Role::Admin), Scope::Application).await?;

    let engine = ReconciliationEngine::new(
        state.service_records(),
        state.organizations(),
        SystemClock,
        state.reconciliation.workers(),
    );
    let report = engine.reconcile(OrganizationId::from_uuid(org_id)).await?;

    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parses_statuses_and_dates() {
        let query = ListServiceRecordsQuery {
            status: Some("em_andamento".into()),
            payment_status: Some("pago".into()),
            from: Some("2024-03-01".into()),
            to: Some("2024-03-31".into()),
            ..Default::default()
        };

        let filter = query.filter().unwrap();

        assert_eq!(filter.status, Some(ServiceStatus::EmAndamento));
        assert_eq!(filter.payment_status, Some(PaymentStatus::Pago));
        assert_eq!(filter.from.unwrap().to_string(), "2024-03-01");
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        let query = ListServiceRecordsQuery {
            payment_status: Some("paid".into()),
            ..Default::default()
        };
        let err = query.filter().unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "payment_status"));
    }

    #[test]
    fn test_filter_rejects_inverted_range() {
        let query = ListServiceRecordsQuery {
            from: Some("2024-04-01".into()),
            to: Some("2024-03-01".into()),
            ..Default::default()
        };
        assert!(query.filter().is_err());
    }

    #[test]
    fn test_page_defaults() {
        let page = ListServiceRecordsQuery::default().page();
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 50);
    }
}
