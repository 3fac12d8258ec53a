//! Page sizes, unit conversion, and fitting raster content onto a page.
//!
//! All physical measures are millimetres. Pixel measures assume the 96-DPI CSS
//! reference pixel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CSS_DPI: f32 = 96.0;
pub const MM_PER_INCH: f32 = 25.4;
pub const POINTS_PER_INCH: f32 = 72.0;

/// Converts CSS pixels to millimetres: `mm = px * 25.4 / 96`.
pub fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_INCH / CSS_DPI
}

pub fn mm_to_px(mm: f32) -> f32 {
    mm * CSS_DPI / MM_PER_INCH
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_INCH / MM_PER_INCH
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_INCH / POINTS_PER_INCH
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("content has zero area ({width_px}x{height_px} px)")]
    EmptyContent { width_px: f32, height_px: f32 },
    #[error("margin {margin_mm}mm leaves no printable area on a {width_mm}x{height_mm}mm page")]
    NoPrintableArea {
        margin_mm: f32,
        width_mm: f32,
        height_mm: f32,
    },
    #[error("negative or non-finite margin: {0}")]
    InvalidMargin(f32),
}

// ────────────────────────────────────────────────────────────────────────────
// Formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageFormat {
    #[serde(alias = "a3")]
    A3,
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "a5")]
    A5,
    #[serde(alias = "letter")]
    Letter,
    #[serde(alias = "legal")]
    Legal,
}

impl PageFormat {
    /// Portrait width × height in millimetres.
    pub const fn portrait_mm(self) -> (f32, f32) {
        match self {
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Physical page dimensions after orientation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        let (w, h) = format.portrait_mm();
        match orientation {
            Orientation::Portrait => PageSize {
                width_mm: w,
                height_mm: h,
            },
            Orientation::Landscape => PageSize {
                width_mm: h,
                height_mm: w,
            },
        }
    }

    /// Checks that `margin_mm` on every side still leaves a printable area.
    pub fn check_margin(&self, margin_mm: f32) -> Result<(), LayoutError> {
        if !margin_mm.is_finite() || margin_mm < 0.0 {
            return Err(LayoutError::InvalidMargin(margin_mm));
        }
        if self.width_mm - 2.0 * margin_mm <= 0.0 || self.height_mm - 2.0 * margin_mm <= 0.0 {
            return Err(LayoutError::NoPrintableArea {
                margin_mm,
                width_mm: self.width_mm,
                height_mm: self.height_mm,
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Where and how large a piece of raster content lands on a page.
///
/// Computed fresh for every export: the content it was derived from may change
/// between exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    /// Unscaled content size in millimetres.
    pub content_width: f32,
    pub content_height: f32,
    pub scale_ratio: f32,
    pub final_width: f32,
    pub final_height: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl PageGeometry {
    /// Fits `width_px × height_px` CSS pixels inside the page minus `margin_mm`
    /// on each side, preserving aspect ratio and centering the result.
    ///
    /// The ratio is capped at 1 unless `allow_upscale` is set.
    pub fn fit(
        width_px: f32,
        height_px: f32,
        page: PageSize,
        margin_mm: f32,
        allow_upscale: bool,
    ) -> Result<Self, LayoutError> {
        if !(width_px > 0.0 && height_px > 0.0) {
            return Err(LayoutError::EmptyContent {
                width_px,
                height_px,
            });
        }
        page.check_margin(margin_mm)?;

        let content_width = px_to_mm(width_px);
        let content_height = px_to_mm(height_px);
        let available_width = page.width_mm - 2.0 * margin_mm;
        let available_height = page.height_mm - 2.0 * margin_mm;

        let fit = (available_width / content_width).min(available_height / content_height);
        let scale_ratio = if allow_upscale {
            fit.max(0.0)
        } else {
            fit.clamp(0.0, 1.0)
        };

        let final_width = content_width * scale_ratio;
        let final_height = content_height * scale_ratio;

        Ok(PageGeometry {
            page_width: page.width_mm,
            page_height: page.height_mm,
            content_width,
            content_height,
            scale_ratio,
            final_width,
            final_height,
            x_offset: (page.width_mm - final_width) / 2.0,
            y_offset: (page.height_mm - final_height) / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> PageSize {
        PageSize::new(PageFormat::A4, Orientation::Portrait)
    }

    fn close(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_px_to_mm_at_96_dpi() {
        assert!(close(px_to_mm(96.0), 25.4, 1e-4));
        assert!(close(mm_to_px(25.4), 96.0, 1e-3));
        assert!(close(mm_to_pt(25.4), 72.0, 1e-3));
    }

    #[test]
    fn test_a4_scenario_with_ten_mm_margin() {
        let geometry = PageGeometry::fit(1600.0, 2200.0, a4(), 10.0, false).unwrap();
        assert!(close(geometry.content_width, 423.33, 0.01));
        assert!(close(geometry.content_height, 582.08, 0.01));
        // min(1, 190 / 423.3, 277 / 582.1): the width term is the smaller one.
        assert!(close(geometry.scale_ratio, 0.4488, 1e-3));
        assert!(close(geometry.final_width, 189.9, 0.2));
        assert!(close(geometry.final_height, 261.3, 0.2));
        assert!(close(geometry.x_offset, (210.0 - geometry.final_width) / 2.0, 1e-4));
        assert!(close(geometry.y_offset, (297.0 - geometry.final_height) / 2.0, 1e-4));
        assert!(geometry.final_height <= 277.0);
    }

    #[test]
    fn test_wide_content_is_bounded_by_width() {
        let geometry = PageGeometry::fit(1600.0, 800.0, a4(), 10.0, false).unwrap();
        assert!(close(geometry.final_width, 190.0, 0.01));
        assert!(close(geometry.x_offset, 10.0, 0.01));
        assert!(geometry.y_offset > 10.0);
    }

    #[test]
    fn test_small_content_is_never_upscaled() {
        let geometry = PageGeometry::fit(200.0, 100.0, a4(), 10.0, false).unwrap();
        assert_eq!(geometry.scale_ratio, 1.0);
        assert!(close(geometry.final_width, px_to_mm(200.0), 1e-4));
    }

    #[test]
    fn test_small_content_upscales_when_requested() {
        let geometry = PageGeometry::fit(200.0, 100.0, a4(), 10.0, true).unwrap();
        assert!(geometry.scale_ratio > 1.0);
        assert!(close(geometry.final_width, 190.0, 0.01));
    }

    #[test]
    fn test_ratio_stays_within_unit_interval_for_all_formats() {
        let formats = [
            PageFormat::A3,
            PageFormat::A4,
            PageFormat::A5,
            PageFormat::Letter,
            PageFormat::Legal,
        ];
        for format in formats {
            for orientation in [Orientation::Portrait, Orientation::Landscape] {
                let page = PageSize::new(format, orientation);
                for margin in [0.0, 5.0, 10.0, 20.0, 40.0] {
                    for (w, h) in [(1.0, 1.0), (800.0, 1131.0), (1600.0, 2200.0), (9000.0, 50.0)] {
                        let g = PageGeometry::fit(w, h, page, margin, false).unwrap();
                        assert!(
                            (0.0..=1.0).contains(&g.scale_ratio),
                            "{format:?} {orientation:?} m={margin} {w}x{h}: {}",
                            g.scale_ratio
                        );
                        assert!(g.final_width >= 0.0 && g.final_height >= 0.0);
                        assert!(g.final_width <= page.width_mm - 2.0 * margin + 1e-3);
                        assert!(g.final_height <= page.height_mm - 2.0 * margin + 1e-3);
                    }
                }
            }
        }
    }

    #[test]
    fn test_landscape_swaps_axes() {
        let page = PageSize::new(PageFormat::A4, Orientation::Landscape);
        assert_eq!(page.width_mm, 297.0);
        assert_eq!(page.height_mm, 210.0);
    }

    #[test]
    fn test_zero_area_content_is_rejected() {
        let err = PageGeometry::fit(0.0, 100.0, a4(), 10.0, false).unwrap_err();
        assert!(matches!(err, LayoutError::EmptyContent { .. }));
    }

    #[test]
    fn test_oversized_margin_is_rejected() {
        let err = PageGeometry::fit(100.0, 100.0, a4(), 105.0, false).unwrap_err();
        assert!(matches!(err, LayoutError::NoPrintableArea { .. }));
        let err = PageGeometry::fit(100.0, 100.0, a4(), -1.0, false).unwrap_err();
        assert_eq!(err, LayoutError::InvalidMargin(-1.0));
    }

    #[test]
    fn test_format_names_deserialize_lowercase() {
        let format: PageFormat = serde_json::from_str("\"letter\"").unwrap();
        assert_eq!(format, PageFormat::Letter);
        assert!(serde_json::from_str::<PageFormat>("\"tabloid\"").is_err());
    }
}
