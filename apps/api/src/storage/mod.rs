//! Document repository: saved resumes, kept apart from the export core.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::models::document::DocumentModel;
use crate::models::resume::StoredDocument;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document store is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("document {0} does not exist")]
    NotFound(String),

    #[error("storage task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Every stored document, oldest first.
    async fn load(&self) -> Result<Vec<StoredDocument>, StorageError>;

    async fn get(&self, id: &str) -> Result<Option<StoredDocument>, StorageError> {
        Ok(self.load().await?.into_iter().find(|d| d.id == id))
    }

    /// Creates a document when `id` is `None`, otherwise replaces the one with
    /// that id, keeping its creation time.
    async fn save(
        &self,
        id: Option<&str>,
        document: DocumentModel,
    ) -> Result<StoredDocument, StorageError>;

    /// Returns whether a document was removed.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file
// ────────────────────────────────────────────────────────────────────────────

/// All documents in one JSON array file, replaced atomically on each write.
pub struct JsonFileRepository {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileRepository {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<StoredDocument>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, documents: &[StoredDocument]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(documents)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&json)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[async_trait]
impl DocumentRepository for JsonFileRepository {
    async fn load(&self) -> Result<Vec<StoredDocument>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn save(
        &self,
        id: Option<&str>,
        document: DocumentModel,
    ) -> Result<StoredDocument, StorageError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_all().await?;
        let now = Utc::now();

        let stored = match id {
            Some(id) => {
                let existing = documents
                    .iter_mut()
                    .find(|d| d.id == id)
                    .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
                existing.document = document;
                existing.updated = now;
                existing.clone()
            }
            None => {
                let stored = StoredDocument {
                    id: Uuid::new_v4().to_string(),
                    created: now,
                    updated: now,
                    document,
                };
                documents.push(stored.clone());
                stored
            }
        };

        self.write_all(&documents).await?;
        debug!(id = %stored.id, total = documents.len(), "Document saved");
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut documents = self.read_all().await?;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        if documents.len() == before {
            return Ok(false);
        }
        self.write_all(&documents).await?;
        debug!(id, "Document deleted");
        Ok(true)
    }
}
