use std::time::Duration;

use thiserror::Error;

use crate::export::remote::RemoteError;
use crate::export::request::StrategyKind;
use crate::layout::page::LayoutError;
use crate::models::document::ValidationError;
use crate::pdf::EncodingError;
use crate::raster::rasterizer::RasterizationError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("remote generation failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("rasterization failed: {0}")]
    Rasterization(#[from] RasterizationError),

    #[error("PDF encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("{0} strategy gave no answer within {1:?}")]
    DeadlineExceeded(StrategyKind, Duration),

    #[error("{0} export needs {1}")]
    Unsupported(StrategyKind, &'static str),

    #[error("export task failed: {0}")]
    Task(String),
}

// Bad geometry surfaces as an encoding failure of the strategy that hit it.
impl From<LayoutError> for ExportError {
    fn from(e: LayoutError) -> Self {
        ExportError::Encoding(EncodingError::Layout(e))
    }
}

impl From<tokio::task::JoinError> for ExportError {
    fn from(e: tokio::task::JoinError) -> Self {
        ExportError::Task(e.to_string())
    }
}
