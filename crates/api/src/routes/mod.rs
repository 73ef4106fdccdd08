//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth_middleware};

pub mod calendar;
pub mod clients;
pub mod health;
pub mod me;
pub mod members;
pub mod organizations;
pub mod service_records;
pub mod technicians;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(me::routes())
        .merge(organizations::routes())
        .merge(members::routes())
        .merge(clients::routes())
        .merge(technicians::routes())
        .merge(service_records::routes())
        .merge(calendar::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
