//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Bearer-token caller resolution
//! - Mapping from the application error taxonomy to HTTP responses

pub mod error;
pub mod middleware;
pub mod routes;
mod tenant;

use axum::Router;
use fieldops_db::{
    ClientRepository, OrganizationRepository, ServiceRecordRepository, TechnicianRepository,
    UserRepository,
};
use fieldops_shared::JwtService;
use fieldops_shared::config::ReconciliationConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Resolves callers from bearer tokens.
    pub jwt_service: Arc<JwtService>,
    /// Settings for on-demand reconciliation runs.
    pub reconciliation: ReconciliationConfig,
}

impl AppState {
    pub(crate) fn users(&self) -> UserRepository {
        UserRepository::new((*self.db).clone())
    }

    pub(crate) fn organizations(&self) -> OrganizationRepository {
        OrganizationRepository::new((*self.db).clone())
    }

    pub(crate) fn clients(&self) -> ClientRepository {
        ClientRepository::new((*self.db).clone())
    }

    pub(crate) fn technicians(&self) -> TechnicianRepository {
        TechnicianRepository::new((*self.db).clone())
    }

    pub(crate) fn service_records(&self) -> ServiceRecordRepository {
        ServiceRecordRepository::new((*self.db).clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
