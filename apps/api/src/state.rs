use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::Config;
use crate::export::ExportOrchestrator;
use crate::storage::DocumentRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Strategy chain in configured order; built once at startup.
    pub exporter: ExportOrchestrator,
    /// Saved documents. The export path only reads from it.
    pub documents: Arc<dyn DocumentRepository>,
    pub assistant: Assistant,
}
