//! # educred-api: Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the environment;
//! see [`AppConfig::from_env`](educred_api::AppConfig::from_env).

use educred_api::{AppConfig, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("EDUCRED_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::from_env();
    tracing::info!(?config, "configuration loaded");
    let port = config.port;

    let metrics = PrometheusBuilder::new().install_recorder().map_err(|e| {
        tracing::error!("Metrics recorder installation failed: {e}");
        e
    })?;

    // Optional: absent DATABASE_URL means in-memory only.
    let db_pool = educred_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let state = AppState::try_with_config(config, db_pool)
        .map_err(|e| {
            tracing::error!("Metadata store initialization failed: {e}");
            e
        })?
        .with_metrics(metrics);

    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Registry hydration failed: {e}");
        e
    })?;

    let app = educred_api::app(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("EduCred API listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
