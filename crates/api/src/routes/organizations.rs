//! Organization management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use fieldops_core::tenancy::{
    NewOrganization, Organization, OrganizationProvisioner, Role, Scope, validate_name,
    validate_timezone,
};
use fieldops_db::store_error;
use fieldops_shared::AppError;
use fieldops_shared::auth::{CreateOrganizationRequest, UpdateOrganizationRequest};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser, tenant};

/// Creates the organizations router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route(
            "/organizations/{org_id}",
            get(get_organization).patch(update_organization),
        )
        .route(
            "/organizations/{org_id}/onboarding/complete",
            post(complete_onboarding),
        )
}

/// POST /organizations - Create an organization with the caller as its admin.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> ApiResult<(StatusCode, Json<Organization>)> {
    let provisioner = OrganizationProvisioner::new(state.organizations(), state.users());
    let org = provisioner
        .provision(
            auth.user_id(),
            NewOrganization {
                name: payload.name,
                slug: payload.slug,
                timezone: payload.timezone,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

/// GET `/organizations/{org_id}` - Organization details, for any member.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Organization>> {
    let access = tenant::require(&state, &auth, org_id, None, Scope::Management).await?;
    Ok(Json(access.organization))
}

/// PATCH `/organizations/{org_id}` - Rename or change timezone. Admin only.
async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> ApiResult<Json<Organization>> {
    tenant::require(&state, &auth, org_id, Some(Role::Admin), Scope::Management).await?;

    if payload.name.is_none() && payload.timezone.is_none() {
        return Err(AppError::validation("body", "no fields provided for update").into());
    }
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(timezone) = &payload.timezone {
        validate_timezone(timezone)?;
    }

    let org = state
        .organizations()
        .update(org_id, payload.name, payload.timezone)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("organization {org_id} not found")))?;

    info!(org_id = %org.id, "Organization updated");
    Ok(Json(org.into()))
}

/// POST `/organizations/{org_id}/onboarding/complete` - Unlocks the main
/// application. Idempotent. Admin only.
async fn complete_onboarding(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Organization>> {
    let access =
        tenant::require(&state, &auth, org_id, Some(Role::Admin), Scope::Management).await?;
    if access.organization.onboarding_completo {
        return Ok(Json(access.organization));
    }

    let org = state
        .organizations()
        .complete_onboarding(org_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound(format!("organization {org_id} not found")))?;

    info!(org_id = %org.id, "Onboarding completed");
    Ok(Json(org.into()))
}
