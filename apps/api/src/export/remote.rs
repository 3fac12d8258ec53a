//! Remote strategy: ships HTML to an external `/generate-pdf` service.
//!
//! The service receives `{"html": ..., "filename": ...}` and answers with PDF
//! bytes. Its answer is never trusted as-is: the payload must carry a PDF
//! header and parse with at least one page before it counts as a success.

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::export::error::ExportError;
use crate::export::html::{documents_html, surfaces_html};
use crate::export::request::{ExportRequest, PdfArtifact, StrategyKind};
use crate::export::strategy::ExportStrategy;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
/// Largest PDF accepted from the service.
pub const MAX_PDF_BYTES: usize = 25 * 1024 * 1024;
const GENERATE_PATH: &str = "/generate-pdf";
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid PDF payload: {0}")]
    InvalidPayload(String),

    #[error("payload exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    html: &'a str,
    filename: &'a str,
}

pub struct RemoteStrategy {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    max_bytes: usize,
}

impl RemoteStrategy {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{GENERATE_PATH}", base_url.trim_end_matches('/')),
            api_key,
            timeout,
            max_bytes: MAX_PDF_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            RemoteError::Timeout(self.timeout)
        } else {
            RemoteError::Http(e)
        }
    }

    async fn call(&self, html: &str, filename: &str) -> Result<Bytes, RemoteError> {
        let mut call = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { html, filename });
        if let Some(key) = &self.api_key {
            call = call.header("x-api-key", key);
        }

        let mut response = call.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !message.is_char_boundary(cut) {
                    cut -= 1;
                }
                message.truncate(cut);
            }
            warn!("PDF service returned {}: {}", status, message);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let too_large = RemoteError::TooLarge {
            limit: self.max_bytes,
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large);
        }

        // Chunked answers carry no length; count as the body arrives.
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

/// Checks that `bytes` is a PDF with at least one page and returns the count.
pub fn verify_pdf(bytes: &[u8]) -> Result<usize, RemoteError> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(RemoteError::InvalidPayload(
            "missing %PDF- header".to_string(),
        ));
    }
    let pages = crate::pdf::count_pages(bytes)
        .map_err(|e| RemoteError::InvalidPayload(e.to_string()))?;
    if pages == 0 {
        return Err(RemoteError::InvalidPayload("document has no pages".to_string()));
    }
    Ok(pages)
}

#[async_trait]
impl ExportStrategy for RemoteStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Remote
    }

    fn deadline(&self) -> Option<Duration> {
        Some(self.timeout)
    }

    async fn generate(&self, request: &ExportRequest) -> Result<PdfArtifact, ExportError> {
        let source = &request.source;
        let html = if !source.surfaces.is_empty() {
            surfaces_html(&source.surfaces, source.display_name())
        } else if !source.models.is_empty() {
            documents_html(&source.models)
        } else {
            return Err(ExportError::Unsupported(self.kind(), "a model or a surface"));
        };

        debug!(endpoint = %self.endpoint, html_bytes = html.len(), "Requesting remote PDF");
        let bytes = self.call(&html, &request.filename).await?;
        let page_count = verify_pdf(&bytes)?;

        Ok(PdfArtifact {
            bytes,
            page_count,
            strategy: self.kind(),
        })
    }
}
