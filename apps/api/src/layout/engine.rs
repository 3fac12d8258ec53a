//! Structured layout: turns a `DocumentModel` into paginated placements.
//!
//! Coordinates are millimetres from the top-left corner of the page. Text runs
//! are positioned by their baseline; rects, lines and the photo box by their
//! top-left corner. The result is a pure function of its inputs, so two calls
//! with the same model and page produce identical plans.
//!
//! # Pagination
//! - A section body is split into entries (blocks separated by blank lines).
//!   An entry is kept on one page when it fits on a fresh page; otherwise its
//!   lines flow across the break.
//! - A heading is only placed when its first entry (or first line, for entries
//!   that have to flow) fits below it.
//! - Skill rows are atomic.
//! - Empty sections produce nothing.
//!
//! Cover letters use the same composer with a letter layout: sender block,
//! date, recipient block, subject, salutation, paragraphs, closing and
//! signature. They have no header band.

use serde::Serialize;

use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable, FontWeight};
use crate::layout::page::{LayoutError, PageSize};
use crate::models::document::{DocumentModel, Rgb, SectionKind, Theme};
use crate::models::letter::{CoverLetter, LetterTemplate};

// ────────────────────────────────────────────────────────────────────────────
// Geometry constants (mm unless noted)
// ────────────────────────────────────────────────────────────────────────────

pub const HEADER_BAND_HEIGHT_MM: f32 = 60.0;
pub const BODY_TOP_MM: f32 = 70.0;
pub const PHOTO_SIZE_MM: f32 = 30.0;
const PHOTO_TOP_MM: f32 = 10.0;

const NAME_BASELINE_MM: f32 = 30.0;
const TITLE_BASELINE_MM: f32 = 40.0;

pub const NAME_SIZE_PT: f32 = 24.0;
pub const TITLE_SIZE_PT: f32 = 14.0;
pub const HEADING_SIZE_PT: f32 = 12.0;
pub const BODY_SIZE_PT: f32 = 10.0;
pub const FOOTER_SIZE_PT: f32 = 8.0;

const HEADING_ADVANCE_MM: f32 = 10.0;
const HEADING_BASELINE_MM: f32 = 5.0;
const UNDERLINE_DROP_MM: f32 = 2.0;
pub const LINE_HEIGHT_MM: f32 = 5.0;
pub const SKILL_ROW_HEIGHT_MM: f32 = 6.0;
const BASELINE_RATIO: f32 = 0.75;
const ENTRY_GAP_MM: f32 = 2.0;
const SECTION_GAP_MM: f32 = 5.0;

/// Space kept free above the bottom edge for the footer.
const FOOTER_ZONE_MM: f32 = 17.0;
const FOOTER_BASELINE_FROM_BOTTOM_MM: f32 = 12.0;

const SIDEBAR_FRACTION: f32 = 0.32;
const SIDEBAR_PADDING_MM: f32 = 3.0;
const COLUMN_GAP_MM: f32 = 6.0;

/// Skill grid columns in a full-width region. The sidebar always uses one.
pub const SKILL_COLUMNS: usize = 2;

const RULE_THICKNESS_MM: f32 = 0.5;
const CONTACT_HEADING: &str = "CONTACT";

/// Continuation pages (and letters) never start closer to the edge than this,
/// whatever the margin.
pub const MIN_TOP_INSET_MM: f32 = 10.0;

// Letter geometry
const SENDER_SIZE_PT: f32 = 14.0;
const SENDER_ROW_MM: f32 = 7.0;
const LETTER_BLOCK_GAP_MM: f32 = 8.0;
const LETTER_PARAGRAPH_GAP_MM: f32 = 4.0;
const SIGNATURE_GAP_MM: f32 = 12.0;
/// Share of the content width left of the recipient block.
const RECIPIENT_OFFSET_FRACTION: f32 = 0.55;
const LETTER_ACCENT_WIDTH_MM: f32 = 6.0;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
    pub family: FontFamily,
    pub weight: FontWeight,
    pub size_pt: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Placement {
    Text(TextRun),
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Rgb,
    },
    /// Box the profile photo is drawn into. The pixels come from the model.
    Photo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

impl Placement {
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Placement::Text(run) => Some(run),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PagePlan {
    pub placements: Vec<Placement>,
}

impl PagePlan {
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.placements.iter().filter_map(Placement::as_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPlan {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub pages: Vec<PagePlan>,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_size(&self) -> PageSize {
        PageSize {
            width_mm: self.page_width,
            height_mm: self.page_height,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays out every non-empty section of `model` on pages of size `page`.
pub fn compute_layout(
    model: &DocumentModel,
    page: PageSize,
    margin_mm: f32,
) -> Result<LayoutPlan, LayoutError> {
    page.check_margin(margin_mm)?;

    let first_top = if model.is_letter() {
        margin_mm.max(MIN_TOP_INSET_MM)
    } else {
        BODY_TOP_MM.max(margin_mm)
    };
    let bottom = page.height_mm - margin_mm.max(FOOTER_ZONE_MM);
    if bottom <= first_top {
        return Err(LayoutError::NoPrintableArea {
            margin_mm,
            width_mm: page.width_mm,
            height_mm: page.height_mm,
        });
    }

    let family = FontFamily::from(model.font_choice());
    let mut composer = Composer {
        page,
        margin: margin_mm,
        first_top,
        bottom,
        family,
        metrics: get_metrics(family),
        theme: model.theme(),
        pages: vec![Vec::new()],
    };

    if model.is_letter() {
        composer.compose_letter(&model.letter);
    } else {
        composer.compose_resume(model);
    }
    composer.place_footers(model);

    Ok(LayoutPlan {
        page_width: page.width_mm,
        page_height: page.height_mm,
        margin: margin_mm,
        pages: composer
            .pages
            .into_iter()
            .map(|placements| PagePlan { placements })
            .collect(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

/// One vertical region with its own running cursor.
#[derive(Debug, Clone, Copy)]
struct Column {
    x: f32,
    width: f32,
    grid_columns: usize,
    page: usize,
    cursor: f32,
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    weight: FontWeight,
    size_pt: f32,
    color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
    Right,
}

/// Rows of cells, each cell an x offset inside the column plus its text.
struct Block {
    rows: Vec<Vec<(f32, String)>>,
    row_height: f32,
}

impl Block {
    fn height(&self) -> f32 {
        self.rows.len() as f32 * self.row_height
    }
}

struct Composer {
    page: PageSize,
    margin: f32,
    first_top: f32,
    bottom: f32,
    family: FontFamily,
    metrics: &'static FontMetricTable,
    theme: Theme,
    pages: Vec<Vec<Placement>>,
}

impl Composer {
    fn top(&self, page: usize) -> f32 {
        if page == 0 {
            self.first_top
        } else {
            self.margin.max(MIN_TOP_INSET_MM)
        }
    }

    fn fresh_capacity(&self) -> f32 {
        self.bottom - self.top(1)
    }

    fn at_top(&self, column: &Column) -> bool {
        (column.cursor - self.top(column.page)).abs() < 1e-3
    }

    fn remaining(&self, column: &Column) -> f32 {
        self.bottom - column.cursor
    }

    fn break_page(&mut self, column: &mut Column) {
        column.page += 1;
        column.cursor = self.top(column.page);
        while self.pages.len() <= column.page {
            self.pages.push(Vec::new());
        }
    }

    /// Breaks unless `height` fits below the cursor. Never breaks at the top of
    /// a page, so every call makes progress.
    fn reserve(&mut self, column: &mut Column, height: f32) {
        if height > self.remaining(column) && !self.at_top(column) {
            self.break_page(column);
        }
    }

    fn push(&mut self, page: usize, placement: Placement) {
        self.pages[page].push(placement);
    }

    fn text(&self, x: f32, baseline: f32, text: &str, style: TextStyle) -> Placement {
        Placement::Text(TextRun {
            x,
            baseline,
            text: text.to_string(),
            family: self.family,
            weight: style.weight,
            size_pt: style.size_pt,
            color: style.color,
        })
    }

    fn body_style(&self) -> TextStyle {
        TextStyle {
            weight: FontWeight::Regular,
            size_pt: BODY_SIZE_PT,
            color: Rgb::BLACK,
        }
    }

    // ── documents ──────────────────────────────────────────────────────────

    fn compose_resume(&mut self, model: &DocumentModel) {
        self.place_header(model);

        let margin = self.margin;
        let content_width = self.page.width_mm - 2.0 * margin;
        if model.template.is_two_column() {
            let sidebar_width = content_width * SIDEBAR_FRACTION;
            let mut sidebar = Column {
                x: margin + SIDEBAR_PADDING_MM,
                width: sidebar_width - 2.0 * SIDEBAR_PADDING_MM,
                grid_columns: 1,
                page: 0,
                cursor: self.first_top,
            };
            let mut main = Column {
                x: margin + sidebar_width + COLUMN_GAP_MM,
                width: content_width - sidebar_width - COLUMN_GAP_MM,
                grid_columns: SKILL_COLUMNS,
                page: 0,
                cursor: self.first_top,
            };

            self.place_contact(&mut sidebar, model);
            for kind in SectionKind::ALL.into_iter().filter(|k| k.is_sidebar()) {
                self.place_section(&mut sidebar, model, kind);
            }
            for kind in SectionKind::ALL.into_iter().filter(|k| !k.is_sidebar()) {
                self.place_section(&mut main, model, kind);
            }
            self.place_sidebar_background(margin, sidebar_width, sidebar.page);
        } else {
            let mut column = Column {
                x: margin,
                width: content_width,
                grid_columns: SKILL_COLUMNS,
                page: 0,
                cursor: self.first_top,
            };
            self.place_contact(&mut column, model);
            for kind in SectionKind::ALL {
                self.place_section(&mut column, model, kind);
            }
        }
    }

    fn compose_letter(&mut self, letter: &CoverLetter) {
        let width = self.page.width_mm - 2.0 * self.margin;
        let mut column = Column {
            x: self.margin,
            width,
            grid_columns: 1,
            page: 0,
            cursor: self.first_top,
        };
        let body = self.body_style();
        let sender_align = match letter.template {
            LetterTemplate::Academic => Align::Center,
            _ => Align::Left,
        };

        // Sender
        let name_style = TextStyle {
            weight: FontWeight::Bold,
            size_pt: SENDER_SIZE_PT,
            color: self.theme.primary,
        };
        let name = [letter.sender_name.trim()];
        let block = self.lines_block(&name, width, name_style, sender_align, SENDER_ROW_MM);
        self.place_block(&mut column, &block, name_style);
        let contact = letter.sender_lines();
        let block = self.lines_block(&contact, width, body, sender_align, LINE_HEIGHT_MM);
        self.place_block(&mut column, &block, body);

        if letter.template == LetterTemplate::Modern {
            let y = column.cursor + LETTER_BLOCK_GAP_MM / 2.0;
            self.push(
                column.page,
                Placement::Line {
                    x1: column.x,
                    y1: y,
                    x2: column.x + width,
                    y2: y,
                    thickness: RULE_THICKNESS_MM,
                    color: self.theme.primary,
                },
            );
        }
        column.cursor += LETTER_BLOCK_GAP_MM;

        let date = letter.date.trim();
        if !date.is_empty() {
            let block = self.lines_block(&[date], width, body, Align::Right, LINE_HEIGHT_MM);
            self.place_block(&mut column, &block, body);
            column.cursor += LETTER_PARAGRAPH_GAP_MM;
        }

        // Recipient, in the right-hand part of the page
        let recipient = letter.recipient_lines();
        if !recipient.is_empty() {
            let offset = width * RECIPIENT_OFFSET_FRACTION;
            let mut right = Column {
                x: column.x + offset,
                width: width - offset,
                ..column
            };
            let block =
                self.lines_block(&recipient, right.width, body, Align::Left, LINE_HEIGHT_MM);
            self.place_block(&mut right, &block, body);
            column.page = right.page;
            column.cursor = right.cursor;
        }
        column.cursor += LETTER_BLOCK_GAP_MM;

        if let Some(subject) = letter.subject() {
            let style = TextStyle {
                weight: FontWeight::Bold,
                ..body
            };
            let block =
                self.lines_block(&[subject.as_str()], width, style, Align::Left, LINE_HEIGHT_MM);
            self.place_block(&mut column, &block, style);
            column.cursor += LETTER_PARAGRAPH_GAP_MM;
        }

        let mut paragraphs = vec![letter.salutation()];
        paragraphs.extend(letter.paragraphs());
        paragraphs.push(letter.closing());
        for paragraph in &paragraphs {
            let block = self.paragraph_block(paragraph, width);
            self.place_block(&mut column, &block, body);
            column.cursor += LETTER_PARAGRAPH_GAP_MM;
        }

        // Signature
        let signature = TextStyle {
            weight: FontWeight::Bold,
            ..body
        };
        let block = self.lines_block(&name, width, signature, Align::Left, LINE_HEIGHT_MM);
        self.reserve(&mut column, SIGNATURE_GAP_MM + block.height());
        if !self.at_top(&column) {
            column.cursor += SIGNATURE_GAP_MM;
        }
        self.place_block(&mut column, &block, signature);

        if letter.template == LetterTemplate::Creative {
            self.place_letter_accent();
        }
    }

    /// Full-height bar down the left edge of every page, under the text.
    fn place_letter_accent(&mut self) {
        let height = self.page.height_mm;
        let color = self.theme.primary;
        for page in &mut self.pages {
            page.insert(
                0,
                Placement::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: LETTER_ACCENT_WIDTH_MM,
                    height,
                    color,
                },
            );
        }
    }

    // ── header / footer ────────────────────────────────────────────────────

    fn place_header(&mut self, model: &DocumentModel) {
        let width = self.page.width_mm;
        let banded = model.template.has_header_band();

        if banded {
            self.push(
                0,
                Placement::Rect {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height: HEADER_BAND_HEIGHT_MM,
                    color: self.theme.primary,
                },
            );
        } else {
            let y = HEADER_BAND_HEIGHT_MM - 4.0;
            self.push(
                0,
                Placement::Line {
                    x1: self.margin,
                    y1: y,
                    x2: width - self.margin,
                    y2: y,
                    thickness: 0.8,
                    color: self.theme.primary,
                },
            );
        }

        if model.profile_photo.is_some() {
            self.push(
                0,
                Placement::Photo {
                    x: width - self.margin - PHOTO_SIZE_MM,
                    y: PHOTO_TOP_MM,
                    width: PHOTO_SIZE_MM,
                    height: PHOTO_SIZE_MM,
                },
            );
        }

        let (name_color, title_color) = if banded {
            (Rgb::WHITE, Rgb::WHITE)
        } else {
            (self.theme.primary, self.theme.secondary)
        };
        self.centered(
            0,
            model.full_name.trim(),
            NAME_BASELINE_MM,
            TextStyle {
                weight: FontWeight::Bold,
                size_pt: NAME_SIZE_PT,
                color: name_color,
            },
        );
        self.centered(
            0,
            model.title.trim(),
            TITLE_BASELINE_MM,
            TextStyle {
                weight: FontWeight::Regular,
                size_pt: TITLE_SIZE_PT,
                color: title_color,
            },
        );
    }

    /// Centers one line on the page, shrinking the size when it is too wide.
    fn centered(&mut self, page: usize, text: &str, baseline: f32, mut style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let available = self.page.width_mm - 2.0 * self.margin;
        let mut width = self.metrics.width_mm(text, style.size_pt, style.weight);
        if width > available {
            style.size_pt *= available / width;
            width = self.metrics.width_mm(text, style.size_pt, style.weight);
        }
        let x = (self.page.width_mm - width) / 2.0;
        let placement = self.text(x, baseline, text, style);
        self.push(page, placement);
    }

    fn place_footers(&mut self, model: &DocumentModel) {
        let total = self.pages.len();
        let title = if model.is_letter() { "" } else { model.title.trim() };
        let label: Vec<&str> = [model.author_name().trim(), title]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        let label = label.join(" - ");
        let baseline = self.page.height_mm - FOOTER_BASELINE_FROM_BOTTOM_MM;
        let style = TextStyle {
            weight: FontWeight::Regular,
            size_pt: FOOTER_SIZE_PT,
            color: Rgb::FOOTER_GREY,
        };
        for page in 0..total {
            let text = if label.is_empty() {
                format!("{}/{}", page + 1, total)
            } else {
                format!("{label} - {}/{}", page + 1, total)
            };
            self.centered(page, &text, baseline, style);
        }
    }

    fn place_sidebar_background(&mut self, x: f32, width: f32, last_page: usize) {
        for page in 0..=last_page {
            let y = (self.top(page) - 4.0).max(0.0);
            let height = self.bottom - y;
            let color = self.theme.light;
            // Drawn first so text lands on top of it.
            self.pages[page].insert(
                0,
                Placement::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                },
            );
        }
    }

    // ── sections ───────────────────────────────────────────────────────────

    fn place_contact(&mut self, column: &mut Column, model: &DocumentModel) {
        let pieces = model.contact_pieces();
        if pieces.is_empty() {
            return;
        }
        let block = self.paragraph_block(&pieces.join(" | "), column.width);
        self.place_blocks(column, CONTACT_HEADING, vec![block]);
    }

    fn place_section(&mut self, column: &mut Column, model: &DocumentModel, kind: SectionKind) {
        if !model.has_section(kind) {
            return;
        }
        let blocks = match kind {
            SectionKind::Skills => vec![self.skills_block(model.skills.as_slice(), column)],
            other => {
                let text = model.section_text(other).unwrap_or_default();
                split_entries(text)
                    .into_iter()
                    .map(|entry| self.entry_block(&entry, column.width))
                    .collect()
            }
        };
        self.place_blocks(column, kind.heading(), blocks);
    }

    fn place_blocks(&mut self, column: &mut Column, heading: &str, blocks: Vec<Block>) {
        let Some(first) = blocks.first() else {
            return;
        };
        let lead = if first.height() <= self.fresh_capacity() - HEADING_ADVANCE_MM {
            first.height()
        } else {
            first.row_height
        };
        self.place_heading(column, heading, lead);

        for (i, block) in blocks.iter().enumerate() {
            if i > 0 && !self.at_top(column) {
                column.cursor += ENTRY_GAP_MM;
            }
            let style = self.body_style();
            self.place_block(column, block, style);
        }
        column.cursor += SECTION_GAP_MM;
    }

    fn place_heading(&mut self, column: &mut Column, heading: &str, lead: f32) {
        self.reserve(column, HEADING_ADVANCE_MM + lead);

        let style = TextStyle {
            weight: FontWeight::Bold,
            size_pt: HEADING_SIZE_PT,
            color: self.theme.secondary,
        };
        let baseline = column.cursor + HEADING_BASELINE_MM;
        let rule_y = baseline + UNDERLINE_DROP_MM;
        let rule_len = (self.metrics.width_mm(heading, style.size_pt, style.weight) + 2.0)
            .min(column.width);

        let text = self.text(column.x, baseline, heading, style);
        self.push(column.page, text);
        self.push(
            column.page,
            Placement::Line {
                x1: column.x,
                y1: rule_y,
                x2: column.x + rule_len,
                y2: rule_y,
                thickness: RULE_THICKNESS_MM,
                color: self.theme.primary,
            },
        );
        column.cursor += HEADING_ADVANCE_MM;
    }

    fn place_block(&mut self, column: &mut Column, block: &Block, style: TextStyle) {
        let height = block.height();
        if height > self.remaining(column) && height <= self.fresh_capacity() {
            self.reserve(column, height);
        }
        for row in &block.rows {
            self.reserve(column, block.row_height);
            let baseline = column.cursor + block.row_height * BASELINE_RATIO;
            for (offset, text) in row {
                let placement = self.text(column.x + offset, baseline, text, style);
                self.push(column.page, placement);
            }
            column.cursor += block.row_height;
        }
    }

    // ── block builders ─────────────────────────────────────────────────────

    fn paragraph_block(&self, text: &str, width: f32) -> Block {
        let rows = self
            .metrics
            .wrap(text, width, BODY_SIZE_PT, FontWeight::Regular)
            .into_iter()
            .map(|line| vec![(0.0, line)])
            .collect();
        Block {
            rows,
            row_height: LINE_HEIGHT_MM,
        }
    }

    /// One row per wrapped line, each aligned inside `width`.
    fn lines_block(
        &self,
        lines: &[&str],
        width: f32,
        style: TextStyle,
        align: Align,
        row_height: f32,
    ) -> Block {
        let rows = lines
            .iter()
            .flat_map(|line| self.metrics.wrap(line, width, style.size_pt, style.weight))
            .map(|line| {
                let slack = (width - self.metrics.width_mm(&line, style.size_pt, style.weight))
                    .max(0.0);
                let offset = match align {
                    Align::Left => 0.0,
                    Align::Center => slack / 2.0,
                    Align::Right => slack,
                };
                vec![(offset, line)]
            })
            .collect();
        Block { rows, row_height }
    }

    fn entry_block(&self, entry: &[&str], width: f32) -> Block {
        let rows = entry
            .iter()
            .flat_map(|line| {
                self.metrics
                    .wrap(line, width, BODY_SIZE_PT, FontWeight::Regular)
            })
            .map(|line| vec![(0.0, line)])
            .collect();
        Block {
            rows,
            row_height: LINE_HEIGHT_MM,
        }
    }

    fn skills_block(&self, skills: &[String], column: &Column) -> Block {
        let columns = column.grid_columns.max(1);
        let cell_width = column.width / columns as f32;
        let rows = skills
            .chunks(columns)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(i, skill)| {
                        let text = self.fit_cell(&format!("\u{2022} {skill}"), cell_width - 2.0);
                        (i as f32 * cell_width, text)
                    })
                    .collect()
            })
            .collect();
        Block {
            rows,
            row_height: SKILL_ROW_HEIGHT_MM,
        }
    }

    /// Truncates `text` with an ellipsis so it fits in one grid cell.
    fn fit_cell(&self, text: &str, width: f32) -> String {
        let lines = self
            .metrics
            .wrap(text, width, BODY_SIZE_PT, FontWeight::Regular);
        match lines.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, ..] => format!("{first}\u{2026}"),
        }
    }
}

/// Groups non-blank lines into entries separated by blank lines.
fn split_entries(text: &str) -> Vec<Vec<&str>> {
    let mut entries = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                entries.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        entries.push(current);
    }
    entries
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
