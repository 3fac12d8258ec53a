mod assistant;
mod config;
mod errors;
mod export;
mod layout;
mod models;
mod pdf;
mod raster;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::Assistant;
use crate::config::Config;
use crate::export::build_orchestrator;
use crate::raster::rasterizer::Rasterizer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::JsonFileRepository;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV export API v{}", env!("CARGO_PKG_VERSION"));

    // Raster font: without one, pages with text fall through to the next strategy
    let rasterizer = match &config.raster_font_path {
        Some(path) => match Rasterizer::from_font_path(path) {
            Ok(rasterizer) => {
                info!("Raster font loaded from {}", path.display());
                rasterizer
            }
            Err(e) => {
                warn!("Could not load raster font {}: {e}", path.display());
                Rasterizer::without_font()
            }
        },
        None => Rasterizer::without_font(),
    };

    let exporter = build_orchestrator(&config, rasterizer)?;
    info!("Export chain: {:?}", exporter.kinds());

    let documents = Arc::new(JsonFileRepository::new(config.documents_path.clone()));
    info!("Document store: {}", documents.path().display());

    let assistant = Assistant::from_config(&config)?;

    // Build app state
    let state = AppState {
        config: config.clone(),
        exporter,
        documents,
        assistant,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
