use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::export::request::PdfArtifact;

#[derive(Debug, Error, PartialEq)]
pub enum DownloadError {
    #[error("a download was already delivered to this sink")]
    AlreadyDelivered,
}

/// Receives the one artifact an export produces. This is the only side
/// effect of an export; failed attempts never reach it.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, filename: &str, artifact: &PdfArtifact) -> Result<(), DownloadError>;
}

#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub artifact: PdfArtifact,
}

/// Holds the delivered artifact in memory until the caller takes it. Used per
/// HTTP request so the handler can stream the bytes back.
#[derive(Debug, Default)]
pub struct CapturingSink {
    slot: Mutex<Option<Download>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn take(&self) -> Option<Download> {
        self.slot.lock().await.take()
    }
}

#[async_trait]
impl DownloadSink for CapturingSink {
    async fn deliver(&self, filename: &str, artifact: &PdfArtifact) -> Result<(), DownloadError> {
        let mut slot = self.slot.lock().await;
        if slot.is_some() {
            return Err(DownloadError::AlreadyDelivered);
        }
        *slot = Some(Download {
            filename: filename.to_string(),
            artifact: artifact.clone(),
        });
        Ok(())
    }
}

/// Makes a client-supplied name safe for `Content-Disposition` and forces the
/// given extension.
pub fn sanitize_filename(name: &str, extension: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | ';' | '\\' | '/'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('.');
    let stem = match cleaned.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case(extension) => stem,
        _ => cleaned,
    };
    let stem = if stem.trim().is_empty() { "cv" } else { stem.trim() };
    format!("{stem}.{extension}")
}

/// `Content-Disposition` value for an attachment. Non-ASCII names get an
/// ASCII fallback plus the RFC 5987 `filename*` form.
pub fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() {
        return format!("attachment; filename=\"{filename}\"");
    }
    let fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded = urlencoding::encode(filename);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::request::StrategyKind;
    use bytes::Bytes;

    fn artifact() -> PdfArtifact {
        PdfArtifact {
            bytes: Bytes::from_static(b"%PDF-1.5"),
            page_count: 1,
            strategy: StrategyKind::Structured,
        }
    }

    #[tokio::test]
    async fn test_capturing_sink_holds_one_download() {
        let sink = CapturingSink::new();
        sink.deliver("cv.pdf", &artifact()).await.unwrap();
        assert_eq!(
            sink.deliver("again.pdf", &artifact()).await,
            Err(DownloadError::AlreadyDelivered)
        );

        let download = sink.take().await.unwrap();
        assert_eq!(download.filename, "cv.pdf");
        assert_eq!(download.artifact.bytes, Bytes::from_static(b"%PDF-1.5"));
        assert!(sink.take().await.is_none());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cv.pdf", "pdf"), "cv.pdf");
        assert_eq!(sanitize_filename("Mon CV", "pdf"), "Mon CV.pdf");
        assert_eq!(sanitize_filename("CV.PDF", "pdf"), "CV.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd", "pdf"), "passwd.pdf");
        assert_eq!(sanitize_filename("a\"b;c.pdf", "pdf"), "abc.pdf");
        assert_eq!(sanitize_filename("", "doc"), "cv.doc");
        assert_eq!(sanitize_filename("resume.pdf", "doc"), "resume.pdf.doc");
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("cv.pdf"),
            "attachment; filename=\"cv.pdf\""
        );
        assert_eq!(
            content_disposition("Léa.pdf"),
            "attachment; filename=\"L_a.pdf\"; filename*=UTF-8''L%C3%A9a.pdf"
        );
        assert_eq!(
            content_disposition("Lettre-Zoé Petit.pdf"),
            "attachment; filename=\"Lettre-Zo_ Petit.pdf\"; \
             filename*=UTF-8''Lettre-Zo%C3%A9%20Petit.pdf"
        );
    }
}
