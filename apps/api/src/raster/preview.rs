//! Builds the preview surface for one laid-out page.

use std::sync::Arc;

use tracing::warn;

use crate::layout::engine::{LayoutPlan, PagePlan, Placement};
use crate::layout::page::{mm_to_px, CSS_DPI, POINTS_PER_INCH};
use crate::models::document::{DocumentModel, Rgb};
use crate::raster::surface::{SurfaceNode, VisualSurface};

fn pt_to_px(pt: f32) -> f32 {
    pt * CSS_DPI / POINTS_PER_INCH
}

/// Renders `page` of `plan` at 96 CSS px per inch.
///
/// A profile photo that fails to decode is left out; the rest of the page is
/// still rendered.
pub fn render_page(plan: &LayoutPlan, page: &PagePlan, model: &DocumentModel) -> VisualSurface {
    let mut surface = VisualSurface::new(mm_to_px(plan.page_width), mm_to_px(plan.page_height));
    surface.background = Some(Rgb::WHITE);

    for placement in &page.placements {
        let node = match placement {
            Placement::Text(run) => SurfaceNode::Text {
                x: mm_to_px(run.x),
                baseline: mm_to_px(run.baseline),
                text: run.text.clone(),
                size_px: pt_to_px(run.size_pt),
                family: run.family,
                weight: run.weight,
                color: run.color,
            },
            Placement::Rect {
                x,
                y,
                width,
                height,
                color,
            } => SurfaceNode::Rect {
                x: mm_to_px(*x),
                y: mm_to_px(*y),
                width: mm_to_px(*width),
                height: mm_to_px(*height),
                color: *color,
            },
            // Only horizontal rules are laid out, drawn as thin rects.
            Placement::Line {
                x1,
                y1,
                x2,
                thickness,
                color,
                ..
            } => {
                let height = mm_to_px(*thickness).max(1.0);
                SurfaceNode::Rect {
                    x: mm_to_px(x1.min(*x2)),
                    y: mm_to_px(*y1) - height / 2.0,
                    width: mm_to_px((x2 - x1).abs()),
                    height,
                    color: *color,
                }
            }
            Placement::Photo {
                x,
                y,
                width,
                height,
            } => {
                let Some(photo) = &model.profile_photo else {
                    continue;
                };
                match image::load_from_memory(&photo.bytes) {
                    Ok(decoded) => SurfaceNode::Image {
                        x: mm_to_px(*x),
                        y: mm_to_px(*y),
                        width: mm_to_px(*width),
                        height: mm_to_px(*height),
                        image: Arc::new(decoded.to_rgba8()),
                    },
                    Err(e) => {
                        warn!(error = %e, "Profile photo could not be decoded, skipping it");
                        continue;
                    }
                }
            }
        };
        surface.push(node);
    }
    surface
}

/// One preview surface per page, in page order.
pub fn render_pages(plan: &LayoutPlan, model: &DocumentModel) -> Vec<VisualSurface> {
    plan.pages
        .iter()
        .map(|page| render_page(plan, page, model))
        .collect()
}
