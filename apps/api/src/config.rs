use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::assistant::openai::DEFAULT_MODEL;
use crate::export::remote::{DEFAULT_TIMEOUT, MAX_PDF_BYTES};
use crate::export::StrategyKind;
use crate::raster::rasterizer::DEFAULT_SCALE;

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values stop startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the HTML-to-PDF service. Remote export is off when unset.
    pub remote_pdf_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub remote_timeout: Duration,
    /// Largest PDF accepted from the remote service.
    pub remote_max_bytes: usize,
    pub export_strategies: Vec<StrategyKind>,
    pub raster_scale: u32,
    pub raster_font_path: Option<PathBuf>,
    pub documents_path: PathBuf,
    pub llm_cmd: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            rust_log: "info".to_string(),
            remote_pdf_url: None,
            remote_api_key: None,
            remote_timeout: DEFAULT_TIMEOUT,
            remote_max_bytes: MAX_PDF_BYTES,
            export_strategies: StrategyKind::DEFAULT_ORDER.to_vec(),
            raster_scale: DEFAULT_SCALE,
            raster_font_path: None,
            documents_path: PathBuf::from("data/documents.json"),
            llm_cmd: None,
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let export_strategies = match get("EXPORT_STRATEGIES") {
            Some(list) => {
                let kinds = StrategyKind::parse_list(&list)
                    .map_err(anyhow::Error::msg)
                    .context("EXPORT_STRATEGIES must list remote, raster or structured")?;
                anyhow::ensure!(!kinds.is_empty(), "EXPORT_STRATEGIES is empty");
                kinds
            }
            None => defaults.export_strategies,
        };

        let raster_scale = match get("RASTER_SCALE") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|s| *s > 0)
                .context("RASTER_SCALE must be a positive integer")?,
            None => defaults.raster_scale,
        };

        Ok(Config {
            port: match get("PORT") {
                Some(v) => v
                    .trim()
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
            remote_pdf_url: get("REMOTE_PDF_URL"),
            remote_api_key: get("REMOTE_API_KEY"),
            remote_timeout: match get("REMOTE_TIMEOUT_SECS") {
                Some(v) => Duration::from_secs(
                    v.trim()
                        .parse::<u64>()
                        .context("REMOTE_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                None => defaults.remote_timeout,
            },
            remote_max_bytes: match get("REMOTE_MAX_BYTES") {
                Some(v) => v
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .context("REMOTE_MAX_BYTES must be a positive byte count")?,
                None => defaults.remote_max_bytes,
            },
            export_strategies,
            raster_scale,
            raster_font_path: get("RASTER_FONT_PATH").map(PathBuf::from),
            documents_path: get("DOCUMENTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.documents_path),
            llm_cmd: get("LLM_CMD"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
        })
    }
}
