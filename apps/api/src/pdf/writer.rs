//! Thin PDF writer over `lopdf`.
//!
//! Callers draw in millimetres from the top-left corner; `PageCanvas` flips to
//! PDF points from the bottom-left. Nothing time- or randomness-dependent is
//! written, so the same drawing calls always serialize to the same bytes.

use std::collections::BTreeMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

use crate::layout::page::{mm_to_pt, LayoutError, PageSize};
use crate::models::document::Rgb;
use crate::pdf::text::text_operand;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("page has zero size ({width_mm}x{height_mm} mm)")]
    ZeroSizePage { width_mm: f32, height_mm: f32 },
    #[error("document has no pages")]
    EmptyDocument,
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("failed to compress stream: {0}")]
    Compression(String),
    #[error("failed to write PDF: {0}")]
    Write(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

fn check_page(page: PageSize) -> Result<(), EncodingError> {
    if !(page.width_mm > 0.0 && page.height_mm > 0.0) {
        return Err(EncodingError::ZeroSizePage {
            width_mm: page.width_mm,
            height_mm: page.height_mm,
        });
    }
    Ok(())
}

fn reference_dictionary(entries: BTreeMap<String, ObjectId>) -> Dictionary {
    let mut dict = Dictionary::new();
    for (name, id) in entries {
        dict.set(name, Object::Reference(id));
    }
    dict
}

pub fn flate_compress(data: &[u8]) -> Result<Vec<u8>, EncodingError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| EncodingError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| EncodingError::Compression(e.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    /// Base font name → (resource name, object id).
    fonts: BTreeMap<&'static str, (String, ObjectId)>,
    images: usize,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        PdfWriter {
            doc,
            pages_id,
            page_ids: Vec::new(),
            fonts: BTreeMap::new(),
            images: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Resource name of a base-14 font, registering it on first use.
    pub fn font(&mut self, base_font: &'static str) -> (String, ObjectId) {
        if let Some(entry) = self.fonts.get(base_font) {
            return entry.clone();
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        let name = format!("F{}", self.fonts.len() + 1);
        self.fonts.insert(base_font, (name.clone(), id));
        (name, id)
    }

    /// Embeds RGB8 pixels as a Flate-compressed image XObject.
    pub fn add_rgb_image(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(String, ObjectId), EncodingError> {
        if width == 0 || height == 0 {
            return Err(EncodingError::InvalidImage(format!(
                "image has zero size ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(EncodingError::InvalidImage(format!(
                "expected {expected} bytes of RGB data, got {}",
                pixels.len()
            )));
        }
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            flate_compress(pixels)?,
        )
        .with_compression(false);
        let id = self.doc.add_object(stream);
        self.images += 1;
        Ok((format!("Im{}", self.images), id))
    }

    /// Appends `canvas` as the next page.
    pub fn add_page(&mut self, canvas: PageCanvas) -> Result<(), EncodingError> {
        check_page(canvas.page)?;
        let content = Content {
            operations: canvas.ops,
        }
        .encode()
        .map_err(|e| EncodingError::Write(e.to_string()))?;
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content).with_compression(false));

        let mut resources = Dictionary::new();
        if !canvas.fonts.is_empty() {
            resources.set("Font", reference_dictionary(canvas.fonts));
        }
        if !canvas.xobjects.is_empty() {
            resources.set("XObject", reference_dictionary(canvas.xobjects));
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(mm_to_pt(canvas.page.width_mm)),
                Object::Real(mm_to_pt(canvas.page.height_mm)),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Serializes the document. Fails when no page was added.
    pub fn finish(mut self) -> Result<Vec<u8>, EncodingError> {
        if self.page_ids.is_empty() {
            return Err(EncodingError::EmptyDocument);
        }
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| EncodingError::Write(e.to_string()))?;
        Ok(bytes)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page canvas
// ────────────────────────────────────────────────────────────────────────────

/// Drawing operations for one page, in top-left millimetre coordinates.
pub struct PageCanvas {
    page: PageSize,
    ops: Vec<Operation>,
    fonts: BTreeMap<String, ObjectId>,
    xobjects: BTreeMap<String, ObjectId>,
}

impl PageCanvas {
    pub fn new(page: PageSize) -> Self {
        PageCanvas {
            page,
            ops: Vec::new(),
            fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
        }
    }

    fn x(&self, mm: f32) -> f32 {
        mm_to_pt(mm)
    }

    fn y(&self, mm: f32) -> f32 {
        mm_to_pt(self.page.height_mm - mm)
    }

    fn fill_color(color: Rgb) -> Operation {
        let [r, g, b] = color.to_unit();
        Operation::new("rg", vec![r.into(), g.into(), b.into()])
    }

    fn stroke_color(color: Rgb) -> Operation {
        let [r, g, b] = color.to_unit();
        Operation::new("RG", vec![r.into(), g.into(), b.into()])
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        let bottom = self.y(y + height);
        self.ops.push(Self::fill_color(color));
        self.ops.push(Operation::new(
            "re",
            vec![
                self.x(x).into(),
                bottom.into(),
                mm_to_pt(width).into(),
                mm_to_pt(height).into(),
            ],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    pub fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        color: Rgb,
    ) {
        let bottom = self.y(y + height);
        self.ops.push(Self::stroke_color(color));
        self.ops
            .push(Operation::new("w", vec![mm_to_pt(thickness).into()]));
        self.ops.push(Operation::new(
            "re",
            vec![
                self.x(x).into(),
                bottom.into(),
                mm_to_pt(width).into(),
                mm_to_pt(height).into(),
            ],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb) {
        self.ops.push(Self::stroke_color(color));
        self.ops
            .push(Operation::new("w", vec![mm_to_pt(thickness).into()]));
        self.ops.push(Operation::new(
            "m",
            vec![self.x(from.0).into(), self.y(from.1).into()],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![self.x(to.0).into(), self.y(to.1).into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// One run of text with its baseline at `baseline` mm from the top.
    pub fn text(
        &mut self,
        font: (String, ObjectId),
        size_pt: f32,
        x: f32,
        baseline: f32,
        text: &str,
        color: Rgb,
    ) {
        let (name, id) = font;
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(name.clone().into_bytes()), size_pt.into()],
        ));
        self.ops.push(Self::fill_color(color));
        self.ops.push(Operation::new(
            "Td",
            vec![self.x(x).into(), self.y(baseline).into()],
        ));
        self.ops.push(Operation::new("Tj", vec![text_operand(text)]));
        self.ops.push(Operation::new("ET", vec![]));
        self.fonts.insert(name, id);
    }

    /// Draws an image XObject into the box at (`x`, `y`) sized `width × height` mm.
    pub fn image(&mut self, xobject: (String, ObjectId), x: f32, y: f32, width: f32, height: f32) {
        let (name, id) = xobject;
        let bottom = self.y(y + height);
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                mm_to_pt(width).into(),
                0.into(),
                0.into(),
                mm_to_pt(height).into(),
                self.x(x).into(),
                bottom.into(),
            ],
        ));
        self.ops.push(Operation::new(
            "Do",
            vec![Object::Name(name.clone().into_bytes())],
        ));
        self.ops.push(Operation::new("Q", vec![]));
        self.xobjects.insert(name, id);
    }
}
