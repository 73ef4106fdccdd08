//! Organization membership routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use fieldops_core::tenancy::{Member, MemberManager, parse_role};
use fieldops_shared::auth::{AddMemberRequest, UpdateMemberRequest};
use fieldops_shared::types::{OrganizationId, UserId};
use uuid::Uuid;

use crate::{AppState, error::ApiResult, middleware::AuthUser};

/// Creates the membership router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{org_id}/members",
            get(list_members).post(add_member),
        )
        .route(
            "/organizations/{org_id}/members/{user_id}",
            patch(update_member).delete(remove_member),
        )
}

fn manager(state: &AppState) -> MemberManager<fieldops_db::UserRepository> {
    MemberManager::new(state.users())
}

/// GET `/organizations/{org_id}/members`
async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Member>>> {
    let members = manager(&state)
        .list(auth.user_id(), OrganizationId::from_uuid(org_id))
        .await?;
    Ok(Json(members))
}

/// POST `/organizations/{org_id}/members` - Adds an existing, unaffiliated user.
async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<Member>)> {
    let role = parse_role(&payload.role)?;
    let member = manager(&state)
        .add(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            &payload.email,
            role,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// PATCH `/organizations/{org_id}/members/{user_id}` - Role and activation.
async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> ApiResult<Json<Member>> {
    let role = payload.role.as_deref().map(parse_role).transpose()?;
    let member = manager(&state)
        .update(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            UserId::from_uuid(user_id),
            role,
            payload.active,
        )
        .await?;

    Ok(Json(member))
}

/// DELETE `/organizations/{org_id}/members/{user_id}`
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    manager(&state)
        .remove(
            auth.user_id(),
            OrganizationId::from_uuid(org_id),
            UserId::from_uuid(user_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
