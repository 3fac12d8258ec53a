//! Word export. There is no real DOCX writer: the styled HTML rendition is
//! served under the msword content type, which Word opens with reduced
//! fidelity. Callers are told so through `DocExport::warning`.

use crate::export::download::sanitize_filename;
use crate::export::html::document_html;
use crate::models::document::{DocumentModel, ValidationError};

pub const DOC_CONTENT_TYPE: &str = "application/msword";
pub const DOC_WARNING: &str =
    "HTML document labelled as Word; layout, photo and colours may differ from the PDF";

#[derive(Debug, Clone, PartialEq)]
pub struct DocExport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
    pub warning: &'static str,
}

pub fn export_doc(model: &DocumentModel, filename: &str) -> Result<DocExport, ValidationError> {
    model.validate_for_export()?;
    let stem = filename
        .trim()
        .strip_suffix(".pdf")
        .unwrap_or(filename.trim());
    Ok(DocExport {
        filename: sanitize_filename(stem, "doc"),
        content_type: DOC_CONTENT_TYPE,
        body: document_html(model),
        warning: DOC_WARNING,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DocumentModel {
        DocumentModel {
            title: "Comptable".to_string(),
            full_name: "Paul Girard".to_string(),
            email: "paul@email.com".to_string(),
            summary: "Clôtures mensuelles.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_doc_export_is_labelled_html() {
        let doc = export_doc(&model(), "cv.pdf").unwrap();
        assert_eq!(doc.filename, "cv.doc");
        assert_eq!(doc.content_type, "application/msword");
        assert!(doc.body.starts_with("<!DOCTYPE html>"));
        assert!(doc.body.contains("Paul Girard"));
        assert!(!doc.warning.is_empty());
    }

    #[test]
    fn test_doc_export_validates() {
        let mut m = model();
        m.summary.clear();
        assert_eq!(
            export_doc(&m, "cv"),
            Err(ValidationError::MissingFields(vec!["summary"]))
        );
    }
}
