//! Paints a `VisualSurface` into a fixed-resolution RGB pixel buffer.
//!
//! Rasterization is CPU-bound and synchronous. The export strategies call it
//! through `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use image::RgbaImage;
use serde::Serialize;
use thiserror::Error;
use tiny_skia::{
    Color, ColorU8, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform,
};
use tracing::debug;

use crate::layout::font_metrics::FontWeight;
use crate::models::document::Rgb;
use crate::raster::surface::{SurfaceNode, VisualSurface};

pub const DEFAULT_SCALE: u32 = 2;

#[derive(Debug, Error)]
pub enum RasterizationError {
    #[error("surface has zero area ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },
    #[error("surface is detached from its document")]
    Detached,
    #[error("surface is hidden")]
    Hidden,
    #[error("invalid raster scale {0}, must be at least 1")]
    InvalidScale(u32),
    #[error("surface contains text but no raster font is configured")]
    MissingFont,
    #[error("failed to load raster font: {0}")]
    FontLoad(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    Rgb8,
}

/// An opaque raster: `pixels` is row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub pixels: Vec<u8>,
    pub format: PixelFormat,
    /// Device pixels per CSS pixel the raster was taken at.
    pub scale: u32,
}

impl RasterImage {
    /// Drops the alpha channel of an opaque canvas.
    fn from_pixmap(canvas: &Pixmap, scale: u32) -> Self {
        let pixels = canvas
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue()]
            })
            .collect();
        RasterImage {
            width_px: canvas.width(),
            height_px: canvas.height(),
            pixels,
            format: PixelFormat::Rgb8,
            scale,
        }
    }

    /// Size of the source surface in CSS pixels.
    pub fn css_size(&self) -> (f32, f32) {
        let scale = self.scale.max(1) as f32;
        (self.width_px as f32 / scale, self.height_px as f32 / scale)
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width_px || y >= self.height_px {
            return None;
        }
        let i = ((y * self.width_px + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rasterizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct Rasterizer {
    font: Option<Arc<Font>>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl Rasterizer {
    /// A rasterizer that can paint rects and images but refuses text.
    pub fn without_font() -> Self {
        Rasterizer { font: None }
    }

    pub fn from_font_bytes(bytes: &[u8]) -> Result<Self, RasterizationError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RasterizationError::FontLoad(e.to_string()))?;
        Ok(Rasterizer {
            font: Some(Arc::new(font)),
        })
    }

    pub fn from_font_path(path: &Path) -> Result<Self, RasterizationError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RasterizationError::FontLoad(format!("{}: {e}", path.display())))?;
        Self::from_font_bytes(&bytes)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Paints `surface` at `scale` device pixels per CSS pixel.
    ///
    /// The result is flattened onto the surface background (white when none
    /// is set), so it never carries transparency. The surface is not modified.
    pub fn rasterize(
        &self,
        surface: &VisualSurface,
        scale: u32,
    ) -> Result<RasterImage, RasterizationError> {
        if scale == 0 {
            return Err(RasterizationError::InvalidScale(scale));
        }
        if !surface.attached {
            return Err(RasterizationError::Detached);
        }
        if !surface.visible {
            return Err(RasterizationError::Hidden);
        }
        let s = scale as f32;
        let width_px = (surface.width * s).round();
        let height_px = (surface.height * s).round();
        if !(width_px >= 1.0 && height_px >= 1.0) {
            return Err(RasterizationError::EmptySurface {
                width: surface.width,
                height: surface.height,
            });
        }
        if surface.has_text() && self.font.is_none() {
            return Err(RasterizationError::MissingFont);
        }

        let empty = || RasterizationError::EmptySurface {
            width: surface.width,
            height: surface.height,
        };
        let mut canvas = Pixmap::new(width_px as u32, height_px as u32).ok_or_else(empty)?;
        let background = surface.background.unwrap_or(Rgb::WHITE);
        canvas.fill(Color::from_rgba8(background.0, background.1, background.2, 255));

        for node in &surface.nodes {
            match node {
                SurfaceNode::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(&mut canvas, x * s, y * s, width * s, height * s, *color),
                SurfaceNode::Image {
                    x,
                    y,
                    width,
                    height,
                    image,
                } => {
                    let source = to_pixmap(image)?;
                    let transform = Transform::from_scale(
                        width * s / source.width() as f32,
                        height * s / source.height() as f32,
                    )
                    .post_translate(x * s, y * s);
                    let paint = PixmapPaint {
                        quality: FilterQuality::Bilinear,
                        ..PixmapPaint::default()
                    };
                    canvas.draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
                }
                SurfaceNode::Text {
                    x,
                    baseline,
                    text,
                    size_px,
                    weight,
                    color,
                    ..
                } => {
                    if let Some(font) = &self.font {
                        let pen = Pen {
                            x: x * s,
                            baseline: baseline * s,
                            size_px: size_px * s,
                            weight: *weight,
                            color: *color,
                        };
                        draw_text(&mut canvas, font, text, pen);
                    }
                }
            }
        }

        debug!(
            width_px = canvas.width(),
            height_px = canvas.height(),
            nodes = surface.nodes.len(),
            "Surface rasterized"
        );
        Ok(RasterImage::from_pixmap(&canvas, scale))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Painting helpers
// ────────────────────────────────────────────────────────────────────────────

fn fill_rect(canvas: &mut Pixmap, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
    // Degenerate rects draw nothing.
    let Some(rect) = Rect::from_xywh(x, y, width, height) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = false;
    canvas.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Copies a straight-alpha image into a premultiplied pixmap.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap, RasterizationError> {
    let mut pixmap = Pixmap::new(image.width(), image.height())
        .ok_or_else(|| RasterizationError::InvalidImage("image has zero size".to_string()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Where and how one text run is drawn, in device pixels.
struct Pen {
    x: f32,
    baseline: f32,
    size_px: f32,
    weight: FontWeight,
    color: Rgb,
}

/// Composites fontdue glyph coverage in the run colour, glyph by glyph.
fn draw_text(canvas: &mut Pixmap, font: &Font, text: &str, pen: Pen) {
    // Bold is an overstrike one device pixel to the right.
    let passes: &[i32] = match pen.weight {
        FontWeight::Regular => &[0],
        FontWeight::Bold => &[0, 1],
    };
    let paint = PixmapPaint::default();
    let mut advance = pen.x;
    for c in text.chars() {
        let (metrics, coverage) = font.rasterize(c, pen.size_px);
        if let Some(glyph) = glyph_pixmap(metrics.width, metrics.height, &coverage, pen.color) {
            let left = (advance + metrics.xmin as f32).round() as i32;
            let top = (pen.baseline - (metrics.height as i32 + metrics.ymin) as f32).round() as i32;
            for dx in passes {
                canvas.draw_pixmap(
                    left + dx,
                    top,
                    glyph.as_ref(),
                    &paint,
                    Transform::identity(),
                    None,
                );
            }
        }
        advance += metrics.advance_width;
    }
}

/// Glyph coverage as a pixmap of `color` with coverage for alpha. Blank
/// glyphs such as spaces have no pixmap.
fn glyph_pixmap(width: usize, height: usize, coverage: &[u8], color: Rgb) -> Option<Pixmap> {
    let mut glyph = Pixmap::new(width as u32, height as u32)?;
    for (dst, &alpha) in glyph.pixels_mut().iter_mut().zip(coverage) {
        *dst = ColorU8::from_rgba(color.0, color.1, color.2, alpha).premultiply();
    }
    Some(glyph)
}
