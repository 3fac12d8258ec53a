//! Export orchestrator: runs the strategy chain for one request.
//!
//! Strategies are tried in order until one yields a verified artifact. Each
//! failure is logged and recorded, then the next strategy runs; there are no
//! retries on the same strategy. Only the winning artifact is delivered.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::export::download::DownloadSink;
use crate::export::error::ExportError;
use crate::export::request::{Attempt, ExportRequest, ExportResult, PdfArtifact, StrategyKind};
use crate::export::strategy::ExportStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "strategy", rename_all = "camelCase")]
pub enum ExportState {
    Idle,
    Requesting(StrategyKind),
    Succeeded(StrategyKind),
    Failed(StrategyKind),
    ExhaustedFailed,
}

impl ExportState {
    pub fn can_transition_to(self, next: ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Idle, Requesting(_)) | (Idle, ExhaustedFailed) => true,
            (Requesting(a), Succeeded(b)) | (Requesting(a), Failed(b)) => a == b,
            (Failed(_), Requesting(_)) | (Failed(_), ExhaustedFailed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportState::Idle => f.write_str("idle"),
            ExportState::Requesting(kind) => write!(f, "requesting({kind})"),
            ExportState::Succeeded(kind) => write!(f, "succeeded({kind})"),
            ExportState::Failed(kind) => write!(f, "failed({kind})"),
            ExportState::ExhaustedFailed => f.write_str("exhausted"),
        }
    }
}

/// Walks the state machine for one export and logs every step.
struct Transitions {
    state: ExportState,
    filename: String,
}

impl Transitions {
    fn new(filename: &str) -> Self {
        Transitions {
            state: ExportState::Idle,
            filename: filename.to_string(),
        }
    }

    fn advance(&mut self, next: ExportState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal export transition {} -> {}",
            self.state,
            next
        );
        debug!(filename = %self.filename, from = %self.state, to = %next, "Export state change");
        self.state = next;
    }
}

#[derive(Clone)]
pub struct ExportOrchestrator {
    strategies: Vec<Arc<dyn ExportStrategy>>,
}

impl ExportOrchestrator {
    pub fn new(strategies: Vec<Arc<dyn ExportStrategy>>) -> Self {
        ExportOrchestrator { strategies }
    }

    /// Configured strategies, in default order.
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    fn chain(&self, request: &ExportRequest) -> Vec<Arc<dyn ExportStrategy>> {
        request
            .preference
            .order(&self.kinds())
            .into_iter()
            .filter_map(|kind| self.strategies.iter().find(|s| s.kind() == kind).cloned())
            .collect()
    }

    async fn run(
        strategy: &dyn ExportStrategy,
        request: &ExportRequest,
    ) -> Result<PdfArtifact, ExportError> {
        match strategy.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, strategy.generate(request))
                .await
                .unwrap_or(Err(ExportError::DeadlineExceeded(strategy.kind(), deadline))),
            None => strategy.generate(request).await,
        }
    }

    /// Exports `request`, delivering the first successful artifact to `sink`.
    ///
    /// Never fails as a call: every outcome, including validation errors and
    /// exhaustion, is described by the returned `ExportResult`.
    pub async fn export(&self, request: &ExportRequest, sink: &dyn DownloadSink) -> ExportResult {
        let filename = request.filename.as_str();
        let mut transitions = Transitions::new(filename);

        if let Err(e) = request.validate() {
            warn!(filename, error = %e, "Export rejected before any strategy ran");
            return ExportResult::failure(filename, e.to_string(), Vec::new());
        }

        let chain = self.chain(request);
        let mut attempts = Vec::with_capacity(chain.len());
        let mut last_error = if chain.is_empty() {
            Some(format!(
                "no export strategy available for preference {}",
                String::from(request.preference)
            ))
        } else {
            None
        };

        for strategy in chain {
            let kind = strategy.kind();
            transitions.advance(ExportState::Requesting(kind));
            info!(filename, strategy = %kind, "Generating PDF");

            match Self::run(strategy.as_ref(), request).await {
                Ok(artifact) => {
                    transitions.advance(ExportState::Succeeded(kind));
                    info!(
                        filename,
                        strategy = %kind,
                        pages = artifact.page_count,
                        bytes = artifact.bytes.len(),
                        "PDF generated"
                    );
                    attempts.push(Attempt {
                        strategy: kind,
                        success: true,
                        error: None,
                    });

                    if let Err(e) = sink.deliver(filename, &artifact).await {
                        error!(filename, error = %e, "Download sink refused the artifact");
                        return ExportResult::failure(filename, e.to_string(), attempts);
                    }
                    return ExportResult {
                        success: true,
                        filename: filename.to_string(),
                        strategy_used: Some(kind),
                        page_count: artifact.page_count,
                        error_detail: None,
                        attempts,
                    };
                }
                Err(e) => {
                    transitions.advance(ExportState::Failed(kind));
                    warn!(
                        filename,
                        strategy = %kind,
                        error = %e,
                        "Export strategy failed, falling back"
                    );
                    let detail = e.to_string();
                    attempts.push(Attempt {
                        strategy: kind,
                        success: false,
                        error: Some(detail.clone()),
                    });
                    last_error = Some(detail);
                }
            }
        }

        transitions.advance(ExportState::ExhaustedFailed);
        let detail = last_error.unwrap_or_else(|| "every export strategy failed".to_string());
        error!(
            filename,
            attempts = attempts.len(),
            error = %detail,
            "All export strategies failed"
        );
        ExportResult::failure(filename, detail, attempts)
    }
}

impl fmt::Debug for ExportOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportOrchestrator")
            .field("strategies", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::download::CapturingSink;
    use crate::export::remote::tests::{model, spawn_server, status_server};
    use crate::export::remote::{RemoteStrategy, DEFAULT_TIMEOUT};
    use crate::export::request::{ExportSource, StrategyPreference};
    use crate::export::strategy::{LocalRasterStrategy, StructuredStrategy};
    use crate::layout::engine::compute_layout;
    use crate::layout::page::{Orientation, PageFormat, PageSize};
    use crate::models::document::{DocumentModel, Rgb};
    use crate::raster::preview::render_pages;
    use crate::raster::rasterizer::tests::font_rasterizer;
    use crate::raster::surface::{SurfaceNode, VisualSurface};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Never answers within its deadline.
    struct StalledStrategy {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExportStrategy for StalledStrategy {
        fn kind(&self) -> StrategyKind {
            StrategyKind::Remote
        }

        fn deadline(&self) -> Option<Duration> {
            Some(Duration::from_secs(8))
        }

        async fn generate(&self, _request: &ExportRequest) -> Result<PdfArtifact, ExportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(ExportError::Task("unreachable".to_string()))
        }
    }

    fn surface() -> VisualSurface {
        let mut surface = VisualSurface::new(120.0, 160.0);
        surface.push(SurfaceNode::Rect {
            x: 0.0,
            y: 0.0,
            width: 120.0,
            height: 30.0,
            color: Rgb(52, 152, 219),
        });
        surface
    }

    fn request() -> ExportRequest {
        ExportRequest::new(ExportSource::from_model(model()).with_surfaces(vec![surface()]))
    }

    fn local_chain() -> Vec<Arc<dyn ExportStrategy>> {
        vec![
            Arc::new(LocalRasterStrategy::default()),
            Arc::new(StructuredStrategy),
        ]
    }

    #[test]
    fn test_state_transitions() {
        use ExportState::*;
        let remote = StrategyKind::Remote;
        let raster = StrategyKind::Raster;
        assert!(Idle.can_transition_to(Requesting(remote)));
        assert!(Requesting(remote).can_transition_to(Failed(remote)));
        assert!(Failed(remote).can_transition_to(Requesting(raster)));
        assert!(Requesting(raster).can_transition_to(Succeeded(raster)));
        assert!(Failed(raster).can_transition_to(ExhaustedFailed));
        assert!(!Requesting(remote).can_transition_to(Succeeded(raster)));
        assert!(!Succeeded(raster).can_transition_to(Requesting(remote)));
        assert!(!Idle.can_transition_to(Succeeded(remote)));
        assert!(!ExhaustedFailed.can_transition_to(Requesting(remote)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_timeout_falls_back() {
        let stalled = Arc::new(StalledStrategy {
            calls: AtomicUsize::new(0),
        });
        let mut strategies: Vec<Arc<dyn ExportStrategy>> = vec![stalled.clone()];
        strategies.extend(local_chain());
        let orchestrator = ExportOrchestrator::new(strategies);
        let sink = CapturingSink::new();

        let started = tokio::time::Instant::now();
        let result = orchestrator.export(&request(), &sink).await;

        assert!(result.success, "{result:?}");
        assert_eq!(result.strategy_used, Some(StrategyKind::Raster));
        assert_eq!(stalled.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.attempts.len(), 2);
        assert!(!result.attempts[0].success);
        assert!(result.attempts[1].success);
        assert!(started.elapsed() >= Duration::from_secs(8));
        assert!(started.elapsed() < Duration::from_secs(3600));

        let download = sink.take().await.unwrap();
        assert_eq!(download.artifact.strategy, StrategyKind::Raster);
        assert_eq!(download.artifact.page_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_remote_service_times_out() {
        let app = Router::new().route(
            "/generate-pdf",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                "late"
            }),
        );
        let base = spawn_server(app).await;
        let mut strategies: Vec<Arc<dyn ExportStrategy>> =
            vec![Arc::new(RemoteStrategy::new(&base, None, DEFAULT_TIMEOUT).unwrap())];
        strategies.push(Arc::new(StructuredStrategy));
        let orchestrator = ExportOrchestrator::new(strategies);
        let sink = CapturingSink::new();

        let result = orchestrator.export(&request(), &sink).await;
        assert!(result.success, "{result:?}");
        assert_eq!(result.strategy_used, Some(StrategyKind::Structured));
        assert_eq!(result.attempts[0].strategy, StrategyKind::Remote);
        assert!(!result.attempts[0].success);
        assert!(sink.take().await.is_some());
    }

    #[tokio::test]
    async fn test_remote_error_status_falls_back() {
        let base = spawn_server(status_server(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let mut strategies: Vec<Arc<dyn ExportStrategy>> =
            vec![Arc::new(RemoteStrategy::new(&base, None, DEFAULT_TIMEOUT).unwrap())];
        strategies.extend(local_chain());
        let orchestrator = ExportOrchestrator::new(strategies);
        let sink = CapturingSink::new();

        let result = orchestrator.export(&request(), &sink).await;
        assert!(result.success);
        assert_eq!(result.strategy_used, Some(StrategyKind::Raster));
        assert!(result.attempts[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("500")));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_error_and_delivers_nothing() {
        // A surface with text and no font fails raster; no model fails structured.
        let mut with_text = surface();
        with_text.push(SurfaceNode::Text {
            x: 4.0,
            baseline: 20.0,
            text: "Léa".to_string(),
            size_px: 14.0,
            family: crate::layout::font_metrics::FontFamily::Helvetica,
            weight: crate::layout::font_metrics::FontWeight::Regular,
            color: Rgb::BLACK,
        });
        let request = ExportRequest::new(ExportSource::from_surfaces(vec![with_text]));
        let orchestrator = ExportOrchestrator::new(local_chain());
        let sink = CapturingSink::new();

        let result = orchestrator.export(&request, &sink).await;
        assert!(!result.success);
        assert_eq!(result.strategy_used, None);
        assert_eq!(result.attempts.len(), 2);
        assert!(result.attempts.iter().all(|a| !a.success));
        assert_eq!(result.error_detail, result.attempts[1].error);
        assert!(sink.take().await.is_none());
    }

    #[tokio::test]
    async fn test_validation_error_runs_no_strategy() {
        let stalled = Arc::new(StalledStrategy {
            calls: AtomicUsize::new(0),
        });
        let orchestrator = ExportOrchestrator::new(vec![stalled.clone()]);
        let mut m = model();
        m.email.clear();
        let request = ExportRequest::new(ExportSource::from_model(m));
        let sink = CapturingSink::new();

        let result = orchestrator.export(&request, &sink).await;
        assert!(!result.success);
        assert!(result.attempts.is_empty());
        assert!(result.error_detail.unwrap().contains("email"));
        assert_eq!(stalled.calls.load(Ordering::SeqCst), 0);
        assert!(sink.take().await.is_none());
    }

    #[tokio::test]
    async fn test_preference_only_skips_other_strategies() {
        let orchestrator = ExportOrchestrator::new(local_chain());
        let request = request().with_preference(StrategyPreference::Only(StrategyKind::Structured));
        let result = orchestrator.export(&request, &CapturingSink::new()).await;
        assert!(result.success);
        assert_eq!(result.attempts.len(), 1);
        assert_eq!(result.strategy_used, Some(StrategyKind::Structured));
    }

    #[tokio::test]
    async fn test_preference_for_missing_strategy_fails() {
        let orchestrator = ExportOrchestrator::new(local_chain());
        let request = request().with_preference(StrategyPreference::Only(StrategyKind::Remote));
        let result = orchestrator.export(&request, &CapturingSink::new()).await;
        assert!(!result.success);
        assert!(result.attempts.is_empty());
        assert!(result.error_detail.unwrap().contains("only:remote"));
    }

    #[tokio::test]
    async fn test_repeated_exports_are_identical() {
        let orchestrator = ExportOrchestrator::new(vec![Arc::new(StructuredStrategy)]);
        let first = CapturingSink::new();
        let second = CapturingSink::new();
        let a = orchestrator.export(&request(), &first).await;
        let b = orchestrator.export(&request(), &second).await;
        assert_eq!(a, b);
        assert_eq!(
            first.take().await.unwrap().artifact.bytes,
            second.take().await.unwrap().artifact.bytes
        );
    }

    /// A request carrying `model` and its rendered A4 pages.
    fn rendered_request(model: DocumentModel, filename: &str) -> ExportRequest {
        let page = PageSize::new(PageFormat::A4, Orientation::Portrait);
        let plan = compute_layout(&model, page, 10.0).unwrap();
        let surfaces = render_pages(&plan, &model);
        ExportRequest::new(ExportSource::from_model(model).with_surfaces(surfaces))
            .with_filename(filename)
    }

    fn font_chain(remote_base: &str) -> ExportOrchestrator {
        ExportOrchestrator::new(vec![
            Arc::new(RemoteStrategy::new(remote_base, None, DEFAULT_TIMEOUT).unwrap()),
            Arc::new(LocalRasterStrategy::new(font_rasterizer(), 1)),
            Arc::new(StructuredStrategy),
        ])
    }

    #[tokio::test]
    async fn test_failing_remote_falls_back_to_raster_with_text() {
        let base = spawn_server(status_server(StatusCode::INTERNAL_SERVER_ERROR)).await;
        let orchestrator = font_chain(&base);
        let request = rendered_request(model(), "Léa Martin.pdf");
        assert!(request.source.surfaces.iter().all(|s| s.has_text()));
        let sink = CapturingSink::new();

        let result = orchestrator.export(&request, &sink).await;
        assert!(result.success, "{result:?}");
        assert_eq!(result.strategy_used, Some(StrategyKind::Raster));
        let outcomes: Vec<_> = result
            .attempts
            .iter()
            .map(|a| (a.strategy, a.success))
            .collect();
        assert_eq!(
            outcomes,
            vec![(StrategyKind::Remote, false), (StrategyKind::Raster, true)]
        );

        let download = sink.take().await.unwrap();
        assert_eq!(download.filename, "Léa Martin.pdf");
        assert_eq!(download.artifact.strategy, StrategyKind::Raster);
        assert_eq!(download.artifact.page_count, request.source.surfaces.len());
        assert!(download.artifact.bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_concurrent_exports_deliver_their_own_documents() {
        let base = spawn_server(status_server(StatusCode::BAD_GATEWAY)).await;
        let orchestrator = font_chain(&base);
        let other = DocumentModel {
            title: "Chef de projet".to_string(),
            full_name: "Hugo Bernard".to_string(),
            email: "hugo@email.com".to_string(),
            summary: "Pilotage agile.".to_string(),
            experience: "Chef de projet - Capgemini (2018-2024)".to_string(),
            ..Default::default()
        };
        let first_request = rendered_request(model(), "Léa Martin.pdf");
        let second_request = rendered_request(other, "Hugo Bernard.pdf");
        let first = CapturingSink::new();
        let second = CapturingSink::new();

        let (a, b) = tokio::join!(
            orchestrator.export(&first_request, &first),
            orchestrator.export(&second_request, &second)
        );
        assert!(a.success && b.success, "{a:?} {b:?}");
        assert_eq!(a.filename, "Léa Martin.pdf");
        assert_eq!(b.filename, "Hugo Bernard.pdf");

        let first = first.take().await.unwrap();
        let second = second.take().await.unwrap();
        assert_eq!(first.filename, a.filename);
        assert_eq!(second.filename, b.filename);
        assert_ne!(first.artifact.bytes, second.artifact.bytes);

        // Each sink holds exactly what a lone export of its request produces.
        let alone = CapturingSink::new();
        orchestrator.export(&first_request, &alone).await;
        assert_eq!(alone.take().await.unwrap().artifact.bytes, first.artifact.bytes);
    }
}
