//! Visual surface: a retained display list in CSS pixels.
//!
//! A surface is what the user sees in the preview pane. The local raster
//! strategy paints it into pixels, and the remote strategy ships it as a
//! standalone HTML document.

use std::io::Cursor;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{ImageFormat, RgbaImage};
use tracing::warn;

use crate::layout::font_metrics::{FontFamily, FontWeight};
use crate::models::document::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceNode {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Text {
        x: f32,
        baseline: f32,
        text: String,
        size_px: f32,
        family: FontFamily,
        weight: FontWeight,
        color: Rgb,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: Arc<RgbaImage>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualSurface {
    pub width: f32,
    pub height: f32,
    /// False once the element has been removed from the page it lived on.
    pub attached: bool,
    pub visible: bool,
    pub background: Option<Rgb>,
    pub nodes: Vec<SurfaceNode>,
}

impl VisualSurface {
    pub fn new(width: f32, height: f32) -> Self {
        VisualSurface {
            width,
            height,
            attached: true,
            visible: true,
            background: Some(Rgb::WHITE),
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: SurfaceNode) {
        self.nodes.push(node);
    }

    pub fn has_text(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n, SurfaceNode::Text { text, .. } if !text.trim().is_empty()))
    }

    /// The surface as one positioned `<div>` page. Text is escaped and images
    /// are inlined as base64 PNG, so the markup has no external references.
    pub fn to_html_fragment(&self) -> String {
        let mut body = String::new();
        for node in &self.nodes {
            match node {
                SurfaceNode::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    body.push_str(&format!(
                        "<div style=\"position:absolute;left:{x:.2}px;top:{y:.2}px;width:{width:.2}px;height:{height:.2}px;background:{}\"></div>\n",
                        color.to_hex()
                    ));
                }
                SurfaceNode::Text {
                    x,
                    baseline,
                    text,
                    size_px,
                    family,
                    weight,
                    color,
                } => {
                    let top = baseline - size_px * 0.8;
                    let font_weight = match weight {
                        FontWeight::Regular => "normal",
                        FontWeight::Bold => "bold",
                    };
                    body.push_str(&format!(
                        "<div style=\"position:absolute;left:{x:.2}px;top:{top:.2}px;font-size:{size_px:.2}px;line-height:1;font-family:{};font-weight:{font_weight};color:{};white-space:pre\">{}</div>\n",
                        css_family(*family),
                        color.to_hex(),
                        escape_html(text)
                    ));
                }
                SurfaceNode::Image {
                    x,
                    y,
                    width,
                    height,
                    image,
                } => match png_data_url(image) {
                    Some(src) => body.push_str(&format!(
                        "<img src=\"{src}\" style=\"position:absolute;left:{x:.2}px;top:{y:.2}px;width:{width:.2}px;height:{height:.2}px\">\n"
                    )),
                    None => warn!("Dropping image node that failed to encode as PNG"),
                },
            }
        }

        let background = self.background.unwrap_or(Rgb::WHITE).to_hex();
        format!(
            "<div class=\"page\" style=\"position:relative;width:{:.2}px;height:{:.2}px;overflow:hidden;background:{background}\">\n{body}</div>\n",
            self.width, self.height,
        )
    }
}

/// Wraps body markup in a minimal UTF-8 HTML document. Pages break after
/// every `.page` element when printed.
pub fn html_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
         <style>html,body{{margin:0;padding:0}}.page{{page-break-after:always}}.page:last-child{{page-break-after:auto}}</style>\n\
         </head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(title),
    )
}

fn css_family(family: FontFamily) -> &'static str {
    match family {
        FontFamily::Helvetica => "Helvetica, Arial, sans-serif",
        FontFamily::Times => "'Times New Roman', Times, serif",
    }
}

fn png_data_url(image: &RgbaImage) -> Option<String> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .ok()?;
    Some(format!("data:image/png;base64,{}", STANDARD.encode(&buf)))
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn text_node(text: &str) -> SurfaceNode {
        SurfaceNode::Text {
            x: 10.0,
            baseline: 20.0,
            text: text.to_string(),
            size_px: 13.3,
            family: FontFamily::Helvetica,
            weight: FontWeight::Bold,
            color: Rgb::BLACK,
        }
    }

    #[test]
    fn test_new_surface_is_attached_and_visible() {
        let surface = VisualSurface::new(800.0, 1100.0);
        assert!(surface.attached && surface.visible);
        assert!(!surface.has_text());
    }

    #[test]
    fn test_html_escapes_text() {
        let mut surface = VisualSurface::new(100.0, 100.0);
        surface.push(text_node("<script>alert('x')</script> & co"));
        let html = html_document("cv <1>", &surface.to_html_fragment());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co"));
        assert!(html.contains("<title>cv &lt;1&gt;</title>"));
        assert!(html.contains("font-weight:bold"));
    }

    #[test]
    fn test_html_inlines_images_as_png() {
        let mut surface = VisualSurface::new(100.0, 100.0);
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));
        surface.push(SurfaceNode::Image {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 20.0,
            image: Arc::new(image),
        });
        let html = html_document("photo", &surface.to_html_fragment());
        assert!(html.contains("src=\"data:image/png;base64,"));
    }

    #[test]
    fn test_html_renders_rect_colour() {
        let mut surface = VisualSurface::new(100.0, 100.0);
        surface.push(SurfaceNode::Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 20.0,
            color: Rgb(52, 152, 219),
        });
        let html = html_document("band", &surface.to_html_fragment());
        assert!(html.contains("background:#3498db"));
    }

    #[test]
    fn test_has_text_ignores_blank_runs() {
        let mut surface = VisualSurface::new(100.0, 100.0);
        surface.push(text_node("   "));
        assert!(!surface.has_text());
        surface.push(text_node("Jean"));
        assert!(surface.has_text());
    }
}
