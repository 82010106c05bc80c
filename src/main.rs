// Main entry point - Dependency injection, collector task and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use axum::{Router, routing::get};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::collector_service::CollectorService;
use crate::application::dashboard_service::DashboardService;
use crate::application::query_planner::QueryPlanner;
use crate::application::range_service::RangeService;
use crate::infrastructure::config::{load_app_config, load_tank_presets};
use crate::infrastructure::device_bridge::HttpDeviceBridge;
use crate::infrastructure::victoria_repository::VictoriaRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_reading, export_csv, export_table, health_check, history, list_presets, ranges,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/current", get(current_reading))
        .route("/api/history", get(history))
        .route("/api/presets", get(list_presets))
        .route("/api/ranges/:tank_type", get(ranges))
        .route("/api/export", get(export_table))
        .route("/export/csv", get(export_csv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration; any error here is fatal
    let app_config = load_app_config()?;
    let catalog = Arc::new(app_config.catalog()?);
    let presets = Arc::new(load_tank_presets(&app_config.presets_file, &catalog)?);

    // Create adapters (infrastructure layer)
    let repository = Arc::new(VictoriaRepository::new(
        app_config.store.url.clone(),
        app_config.store.write_timeout(),
    ));
    let reader = Arc::new(HttpDeviceBridge::new(app_config.device.clone()));

    // Create services (application layer)
    let planner = QueryPlanner::new(
        repository.clone(),
        catalog.clone(),
        app_config.store.query_timeout(),
        app_config.store.export_timeout(),
    );
    let dashboard_service = DashboardService::new(
        reader.clone(),
        catalog.clone(),
        planner.clone(),
        app_config.device.current_timeout(),
    );
    let range_service = RangeService::new(planner, presets);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let collector_handle = if app_config.collector.enabled {
        let collector = CollectorService::new(
            reader,
            repository,
            catalog,
            app_config.device.sensor_class.clone(),
            app_config.collector.interval(),
            app_config.device.read_timeout(),
        );
        Some(tokio::spawn(async move { collector.run(shutdown_rx).await }))
    } else {
        tracing::info!("Collector disabled, serving dashboard API only");
        None
    };

    let state = Arc::new(AppState {
        dashboard_service,
        range_service,
    });

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!(%addr, store = %app_config.store.url, "Starting aquarium-monitor service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = collector_handle {
        handle.await?;
    }

    Ok(())
}
