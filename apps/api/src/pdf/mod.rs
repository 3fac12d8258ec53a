// PDF encoder: image mode (one raster per page) and structured mode (text and
// vector shapes straight from a layout plan), both on top of lopdf.

pub mod image_mode;
pub mod structured;
pub mod text;
pub mod writer;

pub use image_mode::ImagePdfBuilder;
pub use structured::{encode_structured_batch, encode_structured_pdf};
pub use writer::EncodingError;

/// Counts the pages of an encoded PDF.
pub fn count_pages(bytes: &[u8]) -> Result<usize, lopdf::Error> {
    Ok(lopdf::Document::load_mem(bytes)?.get_pages().len())
}
