//! FieldOps API Server
//!
//! Main entry point for the FieldOps backend service. Also runs the
//! scheduled reconciliation sweep when it is enabled.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldops_api::{AppState, create_router};
use fieldops_core::SystemClock;
use fieldops_core::lifecycle::ReconciliationEngine;
use fieldops_db::{OrganizationRepository, ServiceRecordRepository, connect};
use fieldops_shared::config::ReconciliationConfig;
use fieldops_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldops=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        leeway_secs: config.jwt.leeway_secs,
    });

    if config.reconciliation.schedule_enabled() {
        tokio::spawn(run_reconciliation_schedule(
            db.clone(),
            config.reconciliation.clone(),
        ));
    } else {
        info!("Scheduled reconciliation disabled");
    }

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        reconciliation: config.reconciliation.clone(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Sweeps every active organization at the configured interval.
async fn run_reconciliation_schedule(db: DatabaseConnection, settings: ReconciliationConfig) {
    let engine = ReconciliationEngine::new(
        ServiceRecordRepository::new(db.clone()),
        OrganizationRepository::new(db),
        SystemClock,
        settings.workers(),
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(settings.interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(interval_secs = settings.interval_secs, "Scheduled reconciliation enabled");

    loop {
        ticker.tick().await;
        match engine.sweep().await {
            Ok(reports) => {
                let updated: usize = reports.iter().map(|r| r.updated_count).sum();
                info!(organizations = reports.len(), updated, "Reconciliation sweep finished");
            }
            Err(e) => error!(error = %e, "Reconciliation sweep failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
