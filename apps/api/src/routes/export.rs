use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::doc::export_doc;
use crate::export::{
    content_disposition, sanitize_filename, CapturingSink, ExportRequest, ExportSource,
    StrategyPreference,
};
use crate::export::request::{DEFAULT_FILENAME, DEFAULT_MARGIN_MM};
use crate::layout::engine::compute_layout;
use crate::layout::page::{Orientation, PageFormat, PageSize};
use crate::models::document::DocumentModel;
use crate::models::resume::{sample_resumes, SampleResume};
use crate::raster::preview::render_pages;
use crate::raster::surface::VisualSurface;
use crate::state::AppState;

const X_EXPORT_STRATEGY: HeaderName = HeaderName::from_static("x-export-strategy");
const X_EXPORT_PAGES: HeaderName = HeaderName::from_static("x-export-pages");
const X_EXPORT_WARNING: HeaderName = HeaderName::from_static("x-export-warning");

fn default_margin() -> f32 {
    DEFAULT_MARGIN_MM
}

fn default_true() -> bool {
    true
}

/// Page and strategy options shared by the single and batch exports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub filename: Option<String>,
    #[serde(default)]
    pub page_format: PageFormat,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_margin")]
    pub margin_mm: f32,
    #[serde(default)]
    pub strategy: StrategyPreference,
    /// Renders preview pages so the raster and remote strategies have
    /// surfaces to work from.
    #[serde(default = "default_true")]
    pub render_preview: bool,
}

impl ExportOptions {
    fn page_size(&self) -> PageSize {
        PageSize::new(self.page_format, self.orientation)
    }

    /// Builds the export request for `models`, painting preview pages first
    /// when asked to.
    async fn request(&self, models: Vec<DocumentModel>) -> Result<ExportRequest, AppError> {
        let page = self.page_size();
        page.check_margin(self.margin_mm)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let surfaces = if self.render_preview {
            preview_surfaces(models.clone(), page, self.margin_mm).await?
        } else {
            Vec::new()
        };
        let filename = match &self.filename {
            Some(filename) => filename.clone(),
            None => models
                .first()
                .map(DocumentModel::default_filename)
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        };

        Ok(ExportRequest::new(ExportSource { models, surfaces })
            .with_filename(sanitize_filename(&filename, "pdf"))
            .with_page(self.page_format, self.orientation)
            .with_margin(self.margin_mm)
            .with_preference(self.strategy))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBody {
    pub document: Option<DocumentModel>,
    /// Exports a saved document instead of an inline one.
    pub document_id: Option<String>,
    #[serde(flatten)]
    pub options: ExportOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchExportBody {
    #[serde(default)]
    pub documents: Vec<DocumentModel>,
    #[serde(flatten)]
    pub options: ExportOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocExportBody {
    pub document: Option<DocumentModel>,
    pub document_id: Option<String>,
    pub filename: Option<String>,
}

/// Inline document first, then the saved one named by `document_id`, then a
/// sample record with that id.
async fn resolve_document(
    state: &AppState,
    document: Option<DocumentModel>,
    document_id: Option<&str>,
) -> Result<DocumentModel, AppError> {
    match (document, document_id) {
        (Some(document), _) => Ok(document),
        (None, Some(id)) => {
            if let Some(stored) = state.documents.get(id).await? {
                return Ok(stored.document);
            }
            sample_resumes()
                .iter()
                .find(|sample| sample.id == id)
                .map(SampleResume::to_document)
                .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
        }
        (None, None) => Err(AppError::Validation(
            "document or documentId required".to_string(),
        )),
    }
}

/// Lays out and paints every model, keeping document order. A model that
/// cannot be laid out contributes no page; the structured strategy reports it.
async fn preview_surfaces(
    models: Vec<DocumentModel>,
    page: PageSize,
    margin_mm: f32,
) -> Result<Vec<VisualSurface>, AppError> {
    let surfaces = tokio::task::spawn_blocking(move || {
        let mut surfaces = Vec::new();
        for model in &models {
            match compute_layout(model, page, margin_mm) {
                Ok(plan) => surfaces.extend(render_pages(&plan, model)),
                Err(e) => warn!("Preview skipped for '{}': {e}", model.author_name()),
            }
        }
        surfaces
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))?;
    Ok(surfaces)
}

/// Runs the orchestrator and turns its outcome into a response: the PDF on
/// success, the export result as JSON otherwise.
async fn run_export(state: &AppState, request: ExportRequest) -> Response {
    let sink = CapturingSink::new();
    let result = state.exporter.export(&request, &sink).await;

    match sink.take().await {
        Some(download) if result.success => {
            info!(
                filename = %download.filename,
                strategy = %download.artifact.strategy,
                pages = download.artifact.page_count,
                "Export delivered"
            );
            (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        content_disposition(&download.filename),
                    ),
                    (X_EXPORT_STRATEGY, download.artifact.strategy.to_string()),
                    (X_EXPORT_PAGES, download.artifact.page_count.to_string()),
                ],
                download.artifact.bytes,
            )
                .into_response()
        }
        _ => (StatusCode::UNPROCESSABLE_ENTITY, Json(result)).into_response(),
    }
}

/// POST /api/export
/// Exports one document, inline or saved, to PDF.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(req): Json<ExportBody>,
) -> Result<Response, AppError> {
    let document = resolve_document(&state, req.document, req.document_id.as_deref()).await?;
    let request = req.options.request(vec![document]).await?;
    Ok(run_export(&state, request).await)
}

/// POST /api/export/batch
/// Exports several documents into one PDF, each starting on a new page.
pub async fn handle_export_batch(
    State(state): State<AppState>,
    Json(req): Json<BatchExportBody>,
) -> Result<Response, AppError> {
    if req.documents.is_empty() {
        return Err(AppError::Validation("documents required".to_string()));
    }
    let request = req.options.request(req.documents).await?;
    Ok(run_export(&state, request).await)
}

/// POST /api/export/doc
/// Word download: the HTML rendition under the msword content type.
pub async fn handle_export_doc(
    State(state): State<AppState>,
    Json(req): Json<DocExportBody>,
) -> Result<Response, AppError> {
    let document = resolve_document(&state, req.document, req.document_id.as_deref()).await?;
    let filename = req
        .filename
        .unwrap_or_else(|| document.default_filename());
    let doc = export_doc(&document, &filename)
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, doc.content_type.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&doc.filename)),
            (X_EXPORT_WARNING, doc.warning.to_string()),
        ],
        doc.body,
    )
        .into_response())
}
