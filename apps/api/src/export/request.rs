use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::layout::page::{Orientation, PageFormat, PageSize};
use crate::models::document::{DocumentModel, ValidationError};
use crate::raster::surface::VisualSurface;

pub const DEFAULT_FILENAME: &str = "cv.pdf";
pub const DEFAULT_MARGIN_MM: f32 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Strategy selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Remote HTML-to-PDF service.
    Remote,
    /// Local rasterization of the preview surface, one image per page.
    Raster,
    /// PDF built directly from the model's fields.
    Structured,
}

impl StrategyKind {
    pub const DEFAULT_ORDER: [StrategyKind; 3] = [
        StrategyKind::Remote,
        StrategyKind::Raster,
        StrategyKind::Structured,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Remote => "remote",
            StrategyKind::Raster => "raster",
            StrategyKind::Structured => "structured",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "remote" | "server" => Some(StrategyKind::Remote),
            "raster" | "image" | "canvas" => Some(StrategyKind::Raster),
            "structured" | "text" | "data" => Some(StrategyKind::Structured),
            _ => None,
        }
    }

    /// Parses a comma-separated list, dropping duplicates and keeping the
    /// first occurrence.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, String> {
        let mut kinds = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind =
                Self::parse(name).ok_or_else(|| format!("unknown export strategy '{name}'"))?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request override of the configured strategy order.
///
/// Wire form: `auto`, `only:<kind>`, `prefer:<kind>`, or a bare kind name
/// (same as `prefer:`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyPreference {
    #[default]
    Auto,
    Only(StrategyKind),
    Prefer(StrategyKind),
}

impl StrategyPreference {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            return Some(StrategyPreference::Auto);
        }
        match value.split_once(':') {
            Some((mode, kind)) if mode.eq_ignore_ascii_case("only") => {
                StrategyKind::parse(kind).map(StrategyPreference::Only)
            }
            Some((mode, kind)) if mode.eq_ignore_ascii_case("prefer") => {
                StrategyKind::parse(kind).map(StrategyPreference::Prefer)
            }
            Some(_) => None,
            None => StrategyKind::parse(value).map(StrategyPreference::Prefer),
        }
    }

    /// Applies the preference to the configured order.
    pub fn order(self, configured: &[StrategyKind]) -> Vec<StrategyKind> {
        match self {
            StrategyPreference::Auto => configured.to_vec(),
            StrategyPreference::Only(kind) => configured
                .iter()
                .copied()
                .filter(|k| *k == kind)
                .collect(),
            StrategyPreference::Prefer(kind) => {
                let mut order: Vec<StrategyKind> =
                    configured.iter().copied().filter(|k| *k == kind).collect();
                order.extend(configured.iter().copied().filter(|k| *k != kind));
                order
            }
        }
    }
}

impl TryFrom<String> for StrategyPreference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid strategy preference '{value}'"))
    }
}

impl From<StrategyPreference> for String {
    fn from(value: StrategyPreference) -> Self {
        match value {
            StrategyPreference::Auto => "auto".to_string(),
            StrategyPreference::Only(kind) => format!("only:{kind}"),
            StrategyPreference::Prefer(kind) => format!("prefer:{kind}"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request
// ────────────────────────────────────────────────────────────────────────────

/// What an export is made from. Either part may be missing, not both.
#[derive(Debug, Clone, Default)]
pub struct ExportSource {
    /// Documents in export order. A batch export carries several.
    pub models: Vec<DocumentModel>,
    /// Rendered pages, exported one PDF page each in this order.
    pub surfaces: Vec<VisualSurface>,
}

impl ExportSource {
    pub fn from_model(model: DocumentModel) -> Self {
        ExportSource {
            models: vec![model],
            surfaces: Vec::new(),
        }
    }

    pub fn from_surfaces(surfaces: Vec<VisualSurface>) -> Self {
        ExportSource {
            models: Vec::new(),
            surfaces,
        }
    }

    pub fn with_surfaces(mut self, surfaces: Vec<VisualSurface>) -> Self {
        self.surfaces = surfaces;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.surfaces.is_empty()
    }

    /// Title for generated documents: the first model's name.
    pub fn display_name(&self) -> &str {
        self.models
            .first()
            .map(|m| m.author_name().trim())
            .filter(|name| !name.is_empty())
            .unwrap_or("document")
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: ExportSource,
    pub filename: String,
    pub page_format: PageFormat,
    pub orientation: Orientation,
    pub margin_mm: f32,
    pub preference: StrategyPreference,
}

impl ExportRequest {
    pub fn new(source: ExportSource) -> Self {
        ExportRequest {
            source,
            filename: DEFAULT_FILENAME.to_string(),
            page_format: PageFormat::A4,
            orientation: Orientation::Portrait,
            margin_mm: DEFAULT_MARGIN_MM,
            preference: StrategyPreference::Auto,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_page(mut self, format: PageFormat, orientation: Orientation) -> Self {
        self.page_format = format;
        self.orientation = orientation;
        self
    }

    pub fn with_margin(mut self, margin_mm: f32) -> Self {
        self.margin_mm = margin_mm;
        self
    }

    pub fn with_preference(mut self, preference: StrategyPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.page_format, self.orientation)
    }

    /// Checks the request before any strategy runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source.is_empty() {
            return Err(ValidationError::EmptySource);
        }
        self.source
            .models
            .iter()
            .try_for_each(DocumentModel::validate_for_export)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────────────────

/// A finished PDF, already verified to parse.
#[derive(Debug, Clone)]
pub struct PdfArtifact {
    pub bytes: Bytes,
    pub page_count: usize,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub strategy: StrategyKind,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    pub success: bool,
    pub filename: String,
    pub strategy_used: Option<StrategyKind>,
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub attempts: Vec<Attempt>,
}

impl ExportResult {
    pub fn failure(filename: &str, detail: String, attempts: Vec<Attempt>) -> Self {
        ExportResult {
            success: false,
            filename: filename.to_string(),
            strategy_used: None,
            page_count: 0,
            error_detail: Some(detail),
            attempts,
        }
    }
}
