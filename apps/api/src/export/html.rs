//! HTML renditions handed to the remote generator and to the DOC export.
//!
//! Styles are inline so that several documents can share one page without
//! their themes colliding.

use crate::models::document::{DocumentModel, SectionKind};
use crate::models::letter::LetterTemplate;
use crate::raster::surface::{escape_html, html_document, VisualSurface};

const PAGE_BREAK: &str = "<div style=\"page-break-after:always\"></div>\n";

/// One document with every surface as its own printed page, in order.
pub fn surfaces_html(surfaces: &[VisualSurface], title: &str) -> String {
    let body: String = surfaces.iter().map(VisualSurface::to_html_fragment).collect();
    html_document(title, &body)
}

/// Flowing HTML built from the model alone, styled with its theme.
pub fn document_html(model: &DocumentModel) -> String {
    html_document(model.author_name(), &document_body(model))
}

/// Several models, each starting on a new printed page.
pub fn documents_html(models: &[DocumentModel]) -> String {
    let title = models.first().map(DocumentModel::author_name).unwrap_or("");
    let body = models
        .iter()
        .map(document_body)
        .collect::<Vec<_>>()
        .join(PAGE_BREAK);
    html_document(title, &body)
}

fn document_body(model: &DocumentModel) -> String {
    if model.is_letter() {
        return letter_body(model);
    }
    let theme = model.theme();
    let primary = theme.primary.to_hex();
    let secondary = theme.secondary.to_hex();

    let mut html = format!(
        "<div class=\"cv\" style=\"font-family:{};margin:40px;color:#333\">\n",
        model.font.css_family()
    );

    html.push_str(&format!(
        "<div class=\"cv-header\" style=\"background:{primary};color:#fff;padding:30px\">\n"
    ));
    if let Some(photo) = &model.profile_photo {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"\" style=\"float:right;width:113px;height:113px;object-fit:cover\">\n",
            escape_html(&photo.to_data_url())
        ));
    }
    html.push_str(&format!(
        "<h1 style=\"margin:0\">{}</h1>\n",
        escape_html(&model.full_name)
    ));
    html.push_str(&format!(
        "<h2 style=\"margin:8px 0 0;font-weight:normal\">{}</h2>\n",
        escape_html(&model.title)
    ));
    let contact = model.contact_pieces();
    if !contact.is_empty() {
        let pieces: Vec<String> = contact.iter().map(|c| escape_html(c)).collect();
        html.push_str(&format!(
            "<div style=\"margin-top:8px;font-size:0.9em\">{}</div>\n",
            pieces.join(" | ")
        ));
    }
    html.push_str("</div>\n");

    for kind in SectionKind::ALL {
        if !model.has_section(kind) {
            continue;
        }
        html.push_str(&format!(
            "<div class=\"section\" style=\"margin:20px 0\">\n\
             <h3 style=\"color:{secondary};border-bottom:2px solid {primary};padding-bottom:4px\">{}</h3>\n",
            escape_html(kind.heading())
        ));
        match model.section_text(kind) {
            Some(text) => {
                for paragraph in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
                    let lines: Vec<String> = paragraph.lines().map(escape_html).collect();
                    html.push_str(&format!("<p>{}</p>\n", lines.join("<br>")));
                }
            }
            None => {
                html.push_str("<ul style=\"columns:2\">\n");
                for skill in model.skills.as_slice() {
                    html.push_str(&format!("<li>{}</li>\n", escape_html(skill)));
                }
                html.push_str("</ul>\n");
            }
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    html
}

fn lines_html(lines: &[&str]) -> String {
    lines.iter().map(|l| escape_html(l)).collect::<Vec<_>>().join("<br>")
}

fn letter_body(model: &DocumentModel) -> String {
    let letter = &model.letter;
    let primary = model.theme().primary.to_hex();
    let sender_align = match letter.template {
        LetterTemplate::Academic => "center",
        _ => "left",
    };
    let accent = match letter.template {
        LetterTemplate::Creative => format!(";border-left:6px solid {primary};padding-left:24px"),
        _ => String::new(),
    };

    let mut html = format!(
        "<div class=\"letter\" style=\"font-family:{};margin:40px;color:#333{accent}\">\n",
        model.font_choice().css_family()
    );
    let rule = match letter.template {
        LetterTemplate::Modern => format!(";border-bottom:2px solid {primary};padding-bottom:8px"),
        _ => String::new(),
    };
    html.push_str(&format!(
        "<div class=\"sender\" style=\"text-align:{sender_align}{rule}\">\n<strong>{}</strong><br>{}</div>\n",
        escape_html(letter.sender_name.trim()),
        lines_html(&letter.sender_lines())
    ));
    if !letter.date.trim().is_empty() {
        html.push_str(&format!(
            "<p style=\"text-align:right\">{}</p>\n",
            escape_html(letter.date.trim())
        ));
    }
    let recipient = letter.recipient_lines();
    if !recipient.is_empty() {
        html.push_str(&format!(
            "<div class=\"recipient\" style=\"margin-left:55%\">{}</div>\n",
            lines_html(&recipient)
        ));
    }
    if let Some(subject) = letter.subject() {
        html.push_str(&format!("<p><strong>{}</strong></p>\n", escape_html(&subject)));
    }
    html.push_str(&format!("<p>{}</p>\n", escape_html(&letter.salutation())));
    for paragraph in letter.paragraphs() {
        html.push_str(&format!("<p>{}</p>\n", escape_html(&paragraph)));
    }
    html.push_str(&format!("<p>{}</p>\n", escape_html(&letter.closing())));
    html.push_str(&format!(
        "<p style=\"margin-top:32px\">{}</p>\n</div>\n",
        escape_html(letter.sender_name.trim())
    ));
    html
}
