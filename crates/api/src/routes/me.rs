//! The resolved caller's own profile.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use fieldops_core::tenancy::{Member, Organization};
use fieldops_db::{ProfileInput, store_error};
use fieldops_shared::AppError;
use fieldops_shared::auth::UpsertProfileRequest;
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Profile plus the organization the caller belongs to, if any.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The caller.
    pub user: Member,
    /// The caller's organization.
    pub organization: Option<Organization>,
}

/// Creates the profile routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(upsert_me))
}

/// GET /me
async fn get_me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let user = state
        .users()
        .find_by_id(auth.user_id().into_inner())
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFound("profile has not been created yet".to_string()))?;

    let organization = match user.organization_id {
        Some(org_id) => state
            .organizations()
            .find_by_id(org_id)
            .await
            .map_err(store_error)?
            .map(Organization::from),
        None => None,
    };

    Ok(Json(MeResponse {
        user: user.into(),
        organization,
    }))
}

/// PUT /me
async fn upsert_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> ApiResult<Json<Member>> {
    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::validation("display_name", "must not be blank").into());
    }
    let email = payload.email.trim();
    if !email.contains('@') {
        return Err(AppError::validation("email", "must be an email address").into());
    }

    let user = state
        .users()
        .upsert_profile(
            auth.user_id().into_inner(),
            ProfileInput {
                display_name: display_name.to_string(),
                email: email.to_lowercase(),
                phone: payload.phone.filter(|p| !p.trim().is_empty()),
            },
        )
        .await
        .map_err(store_error)?;

    info!(user_id = %user.id, "Profile saved");
    Ok(Json(user.into()))
}
