mod catalog;
mod config;
mod db;
mod errors;
mod evaluation;
mod models;
mod planner;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting skillgap API v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate the static catalog. A broken catalog is a
    // deployment error and aborts startup.
    let catalog = Catalog::load_default().context("catalog validation failed")?;
    info!(
        "Catalog loaded: {} skills, {} roles, {} resources",
        catalog.vocabulary.len(),
        catalog.roles.len(),
        catalog.resources.len()
    );

    // Initialize SQLite and the evaluations table
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    let state = AppState {
        db,
        catalog: Arc::new(catalog),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
