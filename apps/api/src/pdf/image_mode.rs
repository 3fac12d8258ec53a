//! Image mode: one raster per page, scaled and centered by a `PageGeometry`.

use crate::layout::page::{PageGeometry, PageSize};
use crate::pdf::writer::{EncodingError, PageCanvas, PdfWriter};
use crate::raster::rasterizer::RasterImage;

pub struct ImagePdfBuilder {
    page: PageSize,
    writer: PdfWriter,
}

impl ImagePdfBuilder {
    pub fn with_page(page: PageSize) -> Self {
        ImagePdfBuilder {
            page,
            writer: PdfWriter::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    /// Appends exactly one page holding `image` placed per `geometry`.
    pub fn add_page(
        &mut self,
        image: &RasterImage,
        geometry: &PageGeometry,
    ) -> Result<(), EncodingError> {
        if !(geometry.final_width > 0.0 && geometry.final_height > 0.0) {
            return Err(EncodingError::InvalidImage(format!(
                "image would be drawn at {}x{} mm",
                geometry.final_width, geometry.final_height
            )));
        }
        let xobject = self
            .writer
            .add_rgb_image(image.width_px, image.height_px, &image.pixels)?;
        let mut canvas = PageCanvas::new(self.page);
        canvas.image(
            xobject,
            geometry.x_offset,
            geometry.y_offset,
            geometry.final_width,
            geometry.final_height,
        );
        self.writer.add_page(canvas)
    }

    pub fn finish(self) -> Result<Vec<u8>, EncodingError> {
        self.writer.finish()
    }
}
