//! Client routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use fieldops_core::tenancy::Scope;
use fieldops_db::entities::clients;
use fieldops_db::{CreateClientInput, store_error};
use fieldops_shared::AppError;
use fieldops_shared::types::{PageRequest, PageResponse};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser, tenant};

/// Creates the clients router.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/organizations/{org_id}/clients",
        get(list_clients).post(create_client),
    )
}

/// GET `/organizations/{org_id}/clients`
async fn list_clients(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<clients::Model>>> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    let clients = state
        .clients()
        .list(org_id, &page)
        .await
        .map_err(store_error)?;
    Ok(Json(clients))
}

/// POST `/organizations/{org_id}/clients`
async fn create_client(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<CreateClientInput>,
) -> ApiResult<(StatusCode, Json<clients::Model>)> {
    tenant::require(&state, &auth, org_id, None, Scope::Application).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name", "must not be blank").into());
    }

    let client = state
        .clients()
        .create(org_id, payload)
        .await
        .map_err(store_error)?;

    info!(org_id = %org_id, client_id = %client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}
