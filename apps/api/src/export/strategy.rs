use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::export::error::ExportError;
use crate::export::request::{ExportRequest, PdfArtifact, StrategyKind};
use crate::layout::engine::compute_layout;
use crate::layout::page::PageGeometry;
use crate::pdf::{encode_structured_batch, encode_structured_pdf, ImagePdfBuilder};
use crate::raster::rasterizer::{Rasterizer, DEFAULT_SCALE};

/// One way of turning an export request into PDF bytes.
///
/// Implementations must not deliver anything themselves: the orchestrator
/// decides which artifact, if any, reaches the download sink.
#[async_trait]
pub trait ExportStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Upper bound on `generate`. `None` means run to completion.
    fn deadline(&self) -> Option<Duration> {
        None
    }

    async fn generate(&self, request: &ExportRequest) -> Result<PdfArtifact, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Local raster
// ────────────────────────────────────────────────────────────────────────────

/// Paints every surface and stacks the images into an image-mode PDF, one page
/// per surface in the order given.
pub struct LocalRasterStrategy {
    rasterizer: Rasterizer,
    scale: u32,
}

impl LocalRasterStrategy {
    pub fn new(rasterizer: Rasterizer, scale: u32) -> Self {
        LocalRasterStrategy { rasterizer, scale }
    }
}

impl Default for LocalRasterStrategy {
    fn default() -> Self {
        Self::new(Rasterizer::without_font(), DEFAULT_SCALE)
    }
}

#[async_trait]
impl ExportStrategy for LocalRasterStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Raster
    }

    async fn generate(&self, request: &ExportRequest) -> Result<PdfArtifact, ExportError> {
        if request.source.surfaces.is_empty() {
            return Err(ExportError::Unsupported(self.kind(), "a rendered surface"));
        }

        let surfaces = request.source.surfaces.clone();
        let rasterizer = self.rasterizer.clone();
        let scale = self.scale;
        let page = request.page_size();
        let margin = request.margin_mm;

        let (bytes, page_count) = tokio::task::spawn_blocking(move || {
            let mut builder = ImagePdfBuilder::with_page(page);
            for (index, surface) in surfaces.iter().enumerate() {
                let image = rasterizer.rasterize(surface, scale)?;
                let (width, height) = image.css_size();
                let geometry = PageGeometry::fit(width, height, page, margin, false)?;
                debug!(
                    page = index + 1,
                    width_px = image.width_px,
                    height_px = image.height_px,
                    ratio = geometry.scale_ratio,
                    "Rasterized page"
                );
                builder.add_page(&image, &geometry)?;
            }
            let count = builder.page_count();
            Ok::<_, ExportError>((builder.finish()?, count))
        })
        .await??;

        Ok(PdfArtifact {
            bytes: Bytes::from(bytes),
            page_count,
            strategy: self.kind(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Structured
// ────────────────────────────────────────────────────────────────────────────

/// Lays every model out and draws them as text and vector shapes, one
/// document after the other.
#[derive(Debug, Default)]
pub struct StructuredStrategy;

#[async_trait]
impl ExportStrategy for StructuredStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structured
    }

    async fn generate(&self, request: &ExportRequest) -> Result<PdfArtifact, ExportError> {
        if request.source.models.is_empty() {
            return Err(ExportError::Unsupported(self.kind(), "a document model"));
        }
        let models = request.source.models.clone();
        let page = request.page_size();
        let margin = request.margin_mm;

        let (bytes, page_count) = tokio::task::spawn_blocking(move || {
            let plans = models
                .iter()
                .map(|model| compute_layout(model, page, margin))
                .collect::<Result<Vec<_>, _>>()?;
            let documents: Vec<_> = models.iter().zip(plans.iter()).collect();
            let bytes = match documents.as_slice() {
                [(model, plan)] => encode_structured_pdf(model, plan, &model.theme())?,
                _ => encode_structured_batch(&documents)?,
            };
            let pages = plans.iter().map(|p| p.page_count()).sum::<usize>();
            Ok::<_, ExportError>((bytes, pages))
        })
        .await??;

        Ok(PdfArtifact {
            bytes: Bytes::from(bytes),
            page_count,
            strategy: self.kind(),
        })
    }
}
