use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::document::{DocumentKind, DocumentModel};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SaveDocumentRequest {
    /// Replaces the stored document with this id when present.
    pub id: Option<String>,
    #[serde(flatten)]
    pub document: DocumentModel,
}

#[derive(Deserialize)]
pub struct ListDocumentsQuery {
    pub kind: Option<DocumentKind>,
}

/// GET /api/documents?kind=resume|letter
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Value>, AppError> {
    let mut documents = state.documents.load().await?;
    if let Some(kind) = query.kind {
        documents.retain(|stored| stored.document.kind == kind);
    }
    Ok(Json(json!({
        "success": true,
        "count": documents.len(),
        "data": documents,
    })))
}

/// GET /api/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let document = state
        .documents
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))?;
    Ok(Json(json!({ "success": true, "data": document })))
}

/// POST /api/documents
/// Creates a document, or replaces an existing one when `id` is given.
pub async fn handle_save_document(
    State(state): State<AppState>,
    Json(req): Json<SaveDocumentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let status = if req.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let saved = state
        .documents
        .save(req.id.as_deref(), req.document)
        .await?;
    Ok((status, Json(json!({ "success": true, "data": saved }))))
}

/// DELETE /api/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.documents.delete(&id).await? {
        return Err(AppError::NotFound(format!("Document {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}
