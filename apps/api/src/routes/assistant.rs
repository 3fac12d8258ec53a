use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/assistant
pub async fn handle_assistant(
    State(state): State<AppState>,
    Json(req): Json<AssistantRequest>,
) -> Result<Json<Value>, AppError> {
    let (response, backend) = state.assistant.ask(&req.prompt).await?;
    Ok(Json(json!({
        "success": true,
        "response": response,
        "backend": backend,
    })))
}
