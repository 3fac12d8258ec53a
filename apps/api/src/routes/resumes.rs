use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::resume::sample_resumes;

/// GET /api/resumes
pub async fn handle_list_resumes() -> Json<Value> {
    let resumes = sample_resumes();
    Json(json!({
        "success": true,
        "count": resumes.len(),
        "data": resumes,
    }))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(Path(id): Path<String>) -> Result<Json<Value>, AppError> {
    let resume = sample_resumes()
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;
    Ok(Json(json!({ "success": true, "data": resume })))
}
