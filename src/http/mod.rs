//! JSON HTTP API.
//!
//! | Route | Request | Response |
//! |-------|---------|----------|
//! | `POST /api/dedupe` | `{"text": ...}` | `{"processedText": ...}` |
//! | `POST /api/extract` | `{"text": ...}` | record |
//! | `POST /api/process` | `{"text": ...}` | record |
//! | `GET /health` | | `{"status": "ok"}` |
//!
//! Extraction blocks on the model call, so it runs on the blocking pool.

use crate::config::ServerSettings;
use crate::models::{DedupeOutcome, ExtractRequest, ExtractedRecord};
use crate::services::{Extractor, ProcessingService, SentenceDeduplicator};
use crate::{EMPTY_INPUT_NOTICE, Error, PROCESSING_FAILED_NOTICE, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ProcessingService<Arc<dyn Extractor>>>,
}

impl AppState {
    /// Creates handler state from an extractor and deduplicator.
    #[must_use]
    pub fn new(extractor: Arc<dyn Extractor>, deduplicator: SentenceDeduplicator) -> Self {
        Self {
            service: Arc::new(ProcessingService::new(extractor).with_deduplicator(deduplicator)),
        }
    }
}

/// Error body returned by every route.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    const fn empty_input() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: EMPTY_INPUT_NOTICE,
        }
    }

    const fn processing_failed() -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: PROCESSING_FAILED_NOTICE,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(_) => Self::empty_input(),
            _ => Self::processing_failed(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

/// Builds the router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dedupe", post(dedupe))
        .route("/api/extract", post(extract))
        .route("/api/process", post(process))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn dedupe(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<DedupeOutcome> {
    Json(state.service.deduplicator().process(&request.text))
}

async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> std::result::Result<Json<ExtractedRecord>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::empty_input());
    }

    let record = run_blocking(move || {
        state.service.extractor().extract(&request.text).map_err(|e| {
            tracing::error!(error = %e, "Extraction failed");
            e
        })
    })
    .await?;
    Ok(Json(record))
}

async fn process(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> std::result::Result<Json<ExtractedRecord>, ApiError> {
    let outcome = run_blocking(move || state.service.process(&request.text)).await?;
    Ok(Json(outcome.record))
}

async fn run_blocking<T, F>(f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!(error = %e, "Blocking task failed");
            Err(ApiError::processing_failed())
        },
    }
}

/// Runs the HTTP server until it fails.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created or the address cannot
/// be bound.
pub fn run_server(settings: &ServerSettings, state: AppState) -> Result<()> {
    let app = router(state, settings.max_body_bytes);
    let addr = format!("{}:{}", settings.host, settings.port);

    let rt = tokio::runtime::Runtime::new().map_err(|e| Error::OperationFailed {
        operation: "create_runtime".to_string(),
        cause: e.to_string(),
    })?;

    rt.block_on(async {
        let listener =
            tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| Error::OperationFailed {
                    operation: "bind".to_string(),
                    cause: format!("{addr}: {e}"),
                })?;
        tracing::info!(addr = %addr, "Starting HTTP server");

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "serve".to_string(),
                cause: e.to_string(),
            })
    })
}
