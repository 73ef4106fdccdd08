//! Technician routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use fieldops_core::tenancy::Scope;
use fieldops_db::entities::technicians;
use fieldops_db::{CreateTechnicianInput, store_error};
use fieldops_shared::AppError;
use fieldops_shared::types::{PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser, tenant};

/// Creates the technicians router.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/organizations/{org_id}/technicians",
        get(list_technicians).post(create_technician),
    )
}

/// GET `/organizations/{org_id}/technicians`
async fn list_technicians(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<technicians::Model>>> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let technicians = state
        .technicians()
        .list(org_id, &page)
        .await
        .map_err(store_error)?;
    Ok(Json(technicians))
}

/// POST `/organizations/{org_id}/technicians`
async fn create_technician(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateTechnicianInput>,
) -> ApiResult<(StatusCode, Json<technicians::Model>)> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    if payload.full_name.trim().is_empty() {
        return Err(AppError::validation("full_name", "must not be blank").into());
    }

    let technician = state
        .technicians()
        .create(org_id, payload)
        .await
        .map_err(store_error)?;

    info!(org_id = %org_id, technician_id = %technician.id, "Technician created");
    Ok((StatusCode::CREATED, Json(technician)))
}
