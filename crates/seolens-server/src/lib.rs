//! HTTP API for seolens
//!
//! Exposes URL and inline-markup analysis over JSON, with CORS restricted to
//! one configured origin and a request-scoped tracing span per call.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use seolens_core::{AnalysisResult, AnalyzeError, PageSource, SeoAnalyzer};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

pub mod config;


pub type Analyzer = SeoAnalyzer<Arc<dyn PageSource>>;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    cache_control: HeaderValue,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        let max_age = analyzer.cache().ttl().as_secs();
        let cache_control = HeaderValue::from_str(&format!("public, max-age={max_age}"))
            .unwrap_or(HeaderValue::from_static("public, max-age=900"));
        Self {
            analyzer: Arc::new(analyzer),
            cache_control,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }
}

/// Failure of one API request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analyze(err) => status_for(err),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Analyze(err) => err.kind(),
            ApiError::BadRequest(_) => "bad_request",
        }
    }
}

/// The one place an error kind becomes an HTTP status.
pub fn status_for(err: &AnalyzeError) -> StatusCode {
    match err {
        AnalyzeError::InvalidAddress(_)
        | AnalyzeError::UnresolvableHost { .. }
        | AnalyzeError::SsrfBlocked { .. }
        | AnalyzeError::EmptyMarkup => StatusCode::BAD_REQUEST,
        AnalyzeError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AnalyzeError::Upstream { status } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        AnalyzeError::PayloadTooLarge { .. }
        | AnalyzeError::NetworkTimeout
        | AnalyzeError::Network(_) => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(error = %self, kind = self.kind(), "request failed");
        } else {
            debug!(error = %self, kind = self.kind(), "request rejected");
        }

        let body = json!({
            "ok": false,
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// CORS for exactly one origin.
pub fn cors_layer(allowed_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)?;
    if origin.as_bytes() == b"*" {
        anyhow::bail!("wildcard origin is not allowed");
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health))
        .route("/api/analyze", get(analyze_url))
        .route("/api/analyze_html", post(analyze_html))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            info_span!(
                "request",
                id = %Uuid::new_v4(),
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
        .with_state(state)
}

async fn banner() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "seolens" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeQuery {
    url: Option<String>,
}

async fn analyze_url(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| AnalyzeError::InvalidAddress("missing url parameter".to_string()))?;

    let analysis = state.analyzer.analyze_url(&url).await?;
    info!(url = %url, cache = analysis.cache.as_str(), score = analysis.result.score, "analysis served");

    let mut response = Json(analysis.result.as_ref()).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, state.cache_control.clone());
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct InlineRequest {
    url: Option<String>,
    #[serde(default)]
    html: String,
}

async fn analyze_html(
    State(state): State<AppState>,
    body: Result<Json<InlineRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let url = request.url.as_deref().filter(|url| !url.is_empty());

    let result = state.analyzer.analyze_html(&request.html, url)?;
    info!(bytes = request.html.len(), score = result.score, "inline analysis served");
    Ok(Json(result))
}
