//! Month calendar and revenue views.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use fieldops_core::calendar::{CalendarMonth, CalendarService, MonthQuery, MonthRange, RevenueSummary};
use fieldops_core::tenancy::Scope;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser, tenant};

/// Creates the calendar router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/{org_id}/calendar", get(calendar))
        .route("/organizations/{org_id}/revenue", get(revenue))
}

/// GET `/organizations/{org_id}/calendar?year=&month=`
async fn calendar(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<CalendarMonth>> {
    let range = MonthRange::try_from(query)?;
    let access = tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let month = CalendarService::new(state.service_records())
        .calendar(access.organization.id, range)
        .await?;
    Ok(Json(month))
}

/// GET `/organizations/{org_id}/revenue?year=&month=`
async fn revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<RevenueSummary>> {
    let range = MonthRange::try_from(query)?;
    let access = tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let summary = CalendarService::new(state.service_records())
        .revenue(access.organization.id, range)
        .await?;
    Ok(Json(summary))
}
