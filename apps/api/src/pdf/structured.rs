//! Structured mode: draws a `LayoutPlan` as real PDF text and vector shapes.

use image::RgbaImage;
use lopdf::ObjectId;
use tracing::warn;

use crate::layout::engine::{LayoutPlan, Placement};
use crate::models::document::{DocumentModel, ProfilePhoto, Rgb, Theme};
use crate::pdf::writer::{EncodingError, PageCanvas, PdfWriter};

/// Flattens an RGBA image onto white, dropping the alpha channel.
fn flatten_to_rgb(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        for channel in [r, g, b] {
            rgb.push((channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
        }
    }
    rgb
}

fn embed_photo(
    writer: &mut PdfWriter,
    photo: &ProfilePhoto,
) -> Result<(String, ObjectId), EncodingError> {
    let decoded = image::load_from_memory(&photo.bytes)
        .map_err(|e| EncodingError::InvalidImage(e.to_string()))?
        .to_rgba8();
    let rgb = flatten_to_rgb(&decoded);
    writer.add_rgb_image(decoded.width(), decoded.height(), &rgb)
}

/// Encodes every page of `plan`. Page count always equals `plan.page_count()`.
///
/// A profile photo that cannot be decoded is replaced by a box in the theme's
/// light colour instead of failing the export.
pub fn encode_structured_pdf(
    model: &DocumentModel,
    plan: &LayoutPlan,
    theme: &Theme,
) -> Result<Vec<u8>, EncodingError> {
    let mut writer = PdfWriter::new();
    draw_plan(&mut writer, model, plan, theme)?;
    writer.finish()
}

/// Encodes several documents into one PDF, each starting on a new page, in
/// the order given.
pub fn encode_structured_batch(
    documents: &[(&DocumentModel, &LayoutPlan)],
) -> Result<Vec<u8>, EncodingError> {
    let mut writer = PdfWriter::new();
    for (model, plan) in documents {
        draw_plan(&mut writer, model, plan, &model.theme())?;
    }
    writer.finish()
}

fn draw_plan(
    writer: &mut PdfWriter,
    model: &DocumentModel,
    plan: &LayoutPlan,
    theme: &Theme,
) -> Result<(), EncodingError> {
    if plan.pages.is_empty() {
        return Err(EncodingError::EmptyDocument);
    }
    let page_size = plan.page_size();

    let has_photo_box = plan
        .pages
        .iter()
        .flat_map(|p| p.placements.iter())
        .any(|p| matches!(p, Placement::Photo { .. }));
    let photo = match (&model.profile_photo, has_photo_box) {
        (Some(photo), true) => match embed_photo(writer, photo) {
            Ok(xobject) => Some(xobject),
            Err(e) => {
                warn!(error = %e, "Profile photo could not be embedded, drawing a placeholder");
                None
            }
        },
        _ => None,
    };

    for page in &plan.pages {
        let mut canvas = PageCanvas::new(page_size);
        for placement in &page.placements {
            match placement {
                Placement::Text(run) => {
                    if run.text.trim().is_empty() {
                        continue;
                    }
                    let font = writer.font(run.family.base_font(run.weight));
                    canvas.text(font, run.size_pt, run.x, run.baseline, &run.text, run.color);
                }
                Placement::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => canvas.fill_rect(*x, *y, *width, *height, *color),
                Placement::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    thickness,
                    color,
                } => canvas.line((*x1, *y1), (*x2, *y2), *thickness, *color),
                Placement::Photo {
                    x,
                    y,
                    width,
                    height,
                } => match &photo {
                    Some(xobject) => {
                        canvas.image(xobject.clone(), *x, *y, *width, *height);
                        canvas.stroke_rect(*x, *y, *width, *height, 0.5, Rgb::WHITE);
                    }
                    None if model.profile_photo.is_some() => {
                        canvas.fill_rect(*x, *y, *width, *height, theme.light);
                        canvas.stroke_rect(*x, *y, *width, *height, 0.5, theme.primary);
                    }
                    None => {}
                },
            }
        }
        writer.add_page(canvas)?;
    }
    Ok(())
}
