pub mod assistant;
pub mod documents;
pub mod export;
pub mod health;
pub mod resumes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Documents may carry a profile photo as a data URL.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Sample records
        .route("/api/resumes", get(resumes::handle_list_resumes))
        .route("/api/resumes/:id", get(resumes::handle_get_resume))
        // Saved documents
        .route(
            "/api/documents",
            get(documents::handle_list_documents).post(documents::handle_save_document),
        )
        .route(
            "/api/documents/:id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        // Export
        .route("/api/export", post(export::handle_export))
        .route("/api/export/batch", post(export::handle_export_batch))
        .route("/api/export/doc", post(export::handle_export_doc))
        .route("/api/assistant", post(assistant::handle_assistant))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::assistant::rules::RuleBasedBackend;
    use crate::assistant::Assistant;
    use crate::config::Config;
    use crate::export::{ExportOrchestrator, LocalRasterStrategy, StructuredStrategy};
    use crate::storage::JsonFileRepository;

    fn app() -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            config: Config::default(),
            exporter: ExportOrchestrator::new(vec![
                Arc::new(LocalRasterStrategy::default()),
                Arc::new(StructuredStrategy),
            ]),
            documents: Arc::new(JsonFileRepository::new(dir.path().join("documents.json"))),
            assistant: Assistant::new(vec![Arc::new(RuleBasedBackend)]),
        };
        (build_router(state), dir)
    }

    fn document() -> Value {
        json!({
            "title": "Chef de projet",
            "fullName": "Sophie Laurent",
            "email": "sophie@email.com",
            "summary": "Pilotage de projets digitaux.",
            "experience": "Chef de projet - Capgemini (2019-2024)",
            "skills": "Agile, Scrum, Jira",
            "colorScheme": "green"
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_lists_strategies() {
        let (app, _dir) = app();
        let response = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["strategies"], json!(["raster", "structured"]));
        assert_eq!(body["remoteConfigured"], false);
    }

    #[tokio::test]
    async fn test_resumes_list_and_lookup() {
        let (app, _dir) = app();
        let body = json_body(send(&app, Method::GET, "/api/resumes", None).await).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 5);

        let found = send(&app, Method::GET, "/api/resumes/sample-2", None).await;
        assert_eq!(found.status(), StatusCode::OK);
        assert_eq!(json_body(found).await["data"]["id"], "sample-2");

        let missing = send(&app, Method::GET, "/api/resumes/nope", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let body = json_body(missing).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Resume not found");
    }

    #[tokio::test]
    async fn test_assistant_replies_and_rejects_empty_prompt() {
        let (app, _dir) = app();
        let response = send(
            &app,
            Method::POST,
            "/api/assistant",
            Some(json!({ "prompt": "Comment exporter ?" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["backend"], "rules");
        assert!(body["response"].as_str().unwrap().contains("Exporter"));

        let blank = json!({ "prompt": "  " });
        let empty = send(&app, Method::POST, "/api/assistant", Some(blank)).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(empty).await["error"], "Prompt required");
    }

    #[tokio::test]
    async fn test_document_lifecycle() {
        let (app, _dir) = app();
        let created = send(&app, Method::POST, "/api/documents", Some(document())).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = json_body(created).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let mut update = document();
        update["id"] = json!(id);
        update["title"] = json!("Directrice de projet");
        let replaced = send(&app, Method::POST, "/api/documents", Some(update)).await;
        assert_eq!(replaced.status(), StatusCode::OK);

        let list = json_body(send(&app, Method::GET, "/api/documents", None).await).await;
        assert_eq!(list["count"], 1);
        assert_eq!(list["data"][0]["title"], "Directrice de projet");

        let uri = format!("/api/documents/{id}");
        assert_eq!(send(&app, Method::DELETE, &uri, None).await.status(), StatusCode::OK);
        assert_eq!(send(&app, Method::GET, &uri, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, Method::DELETE, &uri, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_unknown_document_is_not_found() {
        let (app, _dir) = app();
        let mut body = document();
        body["id"] = json!("missing");
        let response = send(&app, Method::POST, "/api/documents", Some(body)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_falls_back_and_returns_pdf() {
        let (app, _dir) = app();
        let response = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "document": document(), "filename": "Sophie Laurent" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Sophie Laurent.pdf\""
        );
        // No raster font in tests, so the text pages fall through to structured.
        assert_eq!(headers["x-export-strategy"], "structured");
        assert_eq!(headers["x-export-pages"], "1");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_saved_document() {
        let (app, _dir) = app();
        let created = send(&app, Method::POST, "/api/documents", Some(document())).await;
        let id = json_body(created).await["data"]["id"].clone();

        let response = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "documentId": id, "strategy": "only:structured" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let missing = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "documentId": "missing" })),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_invalid_document_reports_attempts() {
        let (app, _dir) = app();
        let mut doc = document();
        doc["email"] = json!("");
        let body = json!({ "document": doc });
        let response = send(&app, Method::POST, "/api/export", Some(body)).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["errorDetail"].as_str().unwrap().contains("email"));
        assert_eq!(body["attempts"], json!([]));
    }

    #[tokio::test]
    async fn test_export_rejects_bad_request_shapes() {
        let (app, _dir) = app();
        let no_document = send(&app, Method::POST, "/api/export", Some(json!({}))).await;
        assert_eq!(no_document.status(), StatusCode::BAD_REQUEST);

        let huge_margin = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "document": document(), "marginMm": 200.0 })),
        )
        .await;
        assert_eq!(huge_margin.status(), StatusCode::BAD_REQUEST);

        let bad_strategy = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "document": document(), "strategy": "only:fax" })),
        )
        .await;
        assert_eq!(bad_strategy.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_export_batch_one_pdf() {
        let (app, _dir) = app();
        let mut second = document();
        second["fullName"] = json!("Thomas Petit");
        let response = send(
            &app,
            Method::POST,
            "/api/export/batch",
            Some(json!({
                "documents": [document(), second],
                "filename": "equipe.pdf",
                "pageFormat": "letter",
                "orientation": "landscape"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-export-pages"], "2");

        let none = json!({ "documents": [] });
        let empty = send(&app, Method::POST, "/api/export/batch", Some(none)).await;
        assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_doc_is_labelled_word() {
        let (app, _dir) = app();
        let response = send(
            &app,
            Method::POST,
            "/api/export/doc",
            Some(json!({ "document": document(), "filename": "sophie.pdf" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert_eq!(headers[header::CONTENT_TYPE], "application/msword");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"sophie.doc\""
        );
        assert!(headers.contains_key("x-export-warning"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Sophie Laurent"));
    }

    fn letter() -> Value {
        json!({
            "kind": "letter",
            "colorScheme": "purple",
            "letter": {
                "senderName": "Claire Moreau",
                "senderContact": "12 rue des Lilas, Lyon\nclaire@email.com",
                "recipientName": "Durand",
                "companyName": "Orange",
                "position": "Développeuse Frontend",
                "date": "Lyon, le 3 mars 2025",
                "introduction": "Votre offre a retenu toute mon attention.",
                "template": "modern"
            }
        })
    }

    #[tokio::test]
    async fn test_export_letter_uses_letter_filename() {
        let (app, _dir) = app();
        let response = send(
            &app,
            Method::POST,
            "/api/export",
            Some(json!({ "document": letter() })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Lettre-Claire Moreau.pdf\""
        );
        assert_eq!(response.headers()["x-export-pages"], "1");

        let mut unsigned = letter();
        unsigned["letter"]["senderName"] = json!("");
        let body = json!({ "document": unsigned });
        let response = send(&app, Method::POST, "/api/export", Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert!(body["errorDetail"].as_str().unwrap().contains("senderName"));
    }

    #[tokio::test]
    async fn test_list_documents_filters_by_kind() {
        let (app, _dir) = app();
        send(&app, Method::POST, "/api/documents", Some(document())).await;
        send(&app, Method::POST, "/api/documents", Some(letter())).await;

        let all = json_body(send(&app, Method::GET, "/api/documents", None).await).await;
        assert_eq!(all["count"], 2);
        let letters =
            json_body(send(&app, Method::GET, "/api/documents?kind=letter", None).await).await;
        assert_eq!(letters["count"], 1);
        assert_eq!(letters["data"][0]["letter"]["senderName"], "Claire Moreau");
        let bad = send(&app, Method::GET, "/api/documents?kind=memo", None).await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_sample_record_needs_identity() {
        let (app, _dir) = app();
        // Samples carry no name or e-mail, so they resolve but fail validation.
        let body = json!({ "documentId": "sample-1" });
        let response = send(&app, Method::POST, "/api/export", Some(body)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        let detail = body["errorDetail"].as_str().unwrap();
        assert!(detail.contains("fullName") && detail.contains("email"));
    }
}
