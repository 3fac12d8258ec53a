// Export orchestration: strategy chain, remote client, download delivery and
// the HTML/DOC renditions.

pub mod doc;
pub mod download;
pub mod error;
pub mod html;
pub mod orchestrator;
pub mod remote;
pub mod request;
pub mod strategy;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use download::{content_disposition, sanitize_filename, CapturingSink};
pub use orchestrator::ExportOrchestrator;
pub use remote::RemoteStrategy;
pub use request::{ExportRequest, ExportSource, StrategyKind, StrategyPreference};
pub use strategy::{ExportStrategy, LocalRasterStrategy, StructuredStrategy};

use crate::config::Config;
use crate::raster::rasterizer::Rasterizer;

/// Builds the strategy chain in the configured order. The remote strategy is
/// left out when no service URL is configured.
pub fn build_orchestrator(config: &Config, rasterizer: Rasterizer) -> Result<ExportOrchestrator> {
    let mut strategies: Vec<Arc<dyn ExportStrategy>> = Vec::new();
    for kind in &config.export_strategies {
        match kind {
            StrategyKind::Remote => match &config.remote_pdf_url {
                Some(url) => {
                    let remote = RemoteStrategy::new(
                        url,
                        config.remote_api_key.clone(),
                        config.remote_timeout,
                    )
                    .context("Failed to build remote PDF client")?
                    .with_max_bytes(config.remote_max_bytes);
                    info!("Remote PDF service: {}", remote.endpoint());
                    strategies.push(Arc::new(remote));
                }
                None => info!("REMOTE_PDF_URL not set, remote export disabled"),
            },
            StrategyKind::Raster => {
                if !rasterizer.has_font() {
                    warn!("No raster font loaded, raster export will fail on text and fall back");
                }
                strategies.push(Arc::new(LocalRasterStrategy::new(
                    rasterizer.clone(),
                    config.raster_scale,
                )));
            }
            StrategyKind::Structured => strategies.push(Arc::new(StructuredStrategy)),
        }
    }
    if strategies.is_empty() {
        anyhow::bail!("EXPORT_STRATEGIES leaves no usable export strategy");
    }
    Ok(ExportOrchestrator::new(strategies))
}
