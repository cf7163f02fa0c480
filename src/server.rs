/*!
 * HTTP surface.
 *
 * Routes:
 * - `POST /lookup/word` `{input}` → dictionary entry
 * - `POST /lookup/sentence` `{input}` → translation plus per-word entries, one call
 * - `POST /lookup/sentence/async` `{input}` → same shape, one call per word
 * - `POST /speech` `{input}` → `{filename}`
 * - `GET /health`
 *
 * Errors are returned as `{"error": kind, "detail": message}`. A body that
 * is not a valid `{input}` object is `invalid_input`.
 */

use anyhow::{Context, Result};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::enrichment::{EnrichmentRequest, EnrichmentService, SentenceEnrichmentResult, WordEnrichment};
use crate::errors::{AppError, LookupError};
use crate::speech::{SpeechFile, SpeechService};

/// Shared state for all handlers
#[derive(Debug, Clone)]
pub struct AppContext {
    pub enrichment: Arc<EnrichmentService>,
    pub speech: Option<Arc<SpeechService>>,
}

impl AppContext {
    pub fn new(enrichment: EnrichmentService, speech: Option<SpeechService>) -> Self {
        Self {
            enrichment: Arc::new(enrichment),
            speech: speech.map(Arc::new),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let detail = match &self {
            AppError::Lookup(e) => e.to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, detail);
        }

        let body = Json(ErrorResponse {
            error: self.kind_str().to_string(),
            detail,
        });
        (status, body).into_response()
    }
}

/// Build the application router
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/lookup/word", post(lookup_word))
        .route("/lookup/sentence", post(lookup_sentence))
        .route("/lookup/sentence/async", post(lookup_sentence_async))
        .route("/speech", post(generate_speech))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Bind `bind_address` and serve until the process exits
pub async fn run(ctx: AppContext, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(ctx)).await.context("HTTP server failed")?;
    Ok(())
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

type RequestBody = Result<Json<EnrichmentRequest>, JsonRejection>;

/// Unwrap the request body, turning a rejected body into `invalid_input`
fn accept(body: RequestBody) -> Result<EnrichmentRequest, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            warn!("Rejected request body ({}): {}", rejection.status(), rejection.body_text());
            Err(LookupError::InvalidInput(rejection.body_text()).into())
        }
    }
}

/// POST /lookup/word
async fn lookup_word(State(ctx): State<AppContext>, body: RequestBody) -> Result<Json<WordEnrichment>, AppError> {
    let request = accept(body)?;
    let entry = ctx.enrichment.lookup_word(&request.input).await?;
    Ok(Json(entry))
}

/// POST /lookup/sentence
async fn lookup_sentence(
    State(ctx): State<AppContext>,
    body: RequestBody,
) -> Result<Json<SentenceEnrichmentResult>, AppError> {
    let request = accept(body)?;
    let result = ctx.enrichment.lookup_sentence_single(&request.input).await?;
    Ok(Json(result))
}

/// POST /lookup/sentence/async
async fn lookup_sentence_async(
    State(ctx): State<AppContext>,
    body: RequestBody,
) -> Result<Json<SentenceEnrichmentResult>, AppError> {
    let request = accept(body)?;
    let result = ctx.enrichment.lookup_sentence(&request.input).await?;
    Ok(Json(result))
}

/// POST /speech
async fn generate_speech(State(ctx): State<AppContext>, body: RequestBody) -> Result<Json<SpeechFile>, AppError> {
    let request = accept(body)?;
    let speech = ctx.speech.as_ref().ok_or_else(|| {
        AppError::Lookup(LookupError::UnexpectedService(
            "speech synthesis is not available for this provider".to_string(),
        ))
    })?;
    let file = speech.synthesize(&request.input).await?;
    Ok(Json(file))
}
