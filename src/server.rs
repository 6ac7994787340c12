//! HTTP API surface.
//!
//! Thin axum layer over the orchestrator for the web UI: `/search`
//! runs a query, `/export` writes a result file, `/download` serves it
//! back, `/engines` lists the registry. `success` reflects whether the
//! orchestration call itself ran — a search where every engine failed
//! is still a successful response with diagnostic statuses.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::engine::EngineStatus;
use crate::export::{self, ExportFormat};
use crate::query::{FilterKind, ResultFilter, ResultKind, SafeSearch};
use crate::registry::EngineRegistry;
use crate::transport::TransportConfig;
use crate::{EngineResult, Orchestrator, Result, SearchError, SearchQuery, SearchResultSet};

/// Shared server state.
pub struct AppState {
    registry: Arc<EngineRegistry>,
    orchestrator: Orchestrator,
    exports_dir: PathBuf,
}

impl AppState {
    /// Creates server state over a registry.
    pub fn new(registry: Arc<EngineRegistry>, exports_dir: PathBuf) -> Self {
        Self {
            orchestrator: Orchestrator::new(Arc::clone(&registry)),
            registry,
            exports_dir,
        }
    }
}

/// `POST /search` request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_engines")]
    pub engines: Vec<String>,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub ignore_duplicates: bool,
    #[serde(default)]
    pub filter: Option<FilterKind>,
    #[serde(default)]
    pub filter_text: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub safe_search: SafeSearch,
    #[serde(default)]
    pub result_type: Option<String>,
    #[serde(default)]
    pub use_tor: bool,
    #[serde(default = "default_true")]
    pub proxy_verify_ssl: bool,
}

fn default_engines() -> Vec<String> {
    vec!["bing".to_string()]
}

fn default_pages() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// `POST /search` response body.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<EngineResult>,
    pub total: usize,
    pub query: String,
    pub engines: Vec<String>,
    pub statuses: BTreeMap<String, EngineStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    fn failure(query: String, error: String) -> Self {
        Self {
            success: false,
            results: Vec::new(),
            total: 0,
            query,
            engines: Vec::new(),
            statuses: BTreeMap::new(),
            error: Some(error),
        }
    }
}

/// `POST /export` request body.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub results: Vec<EngineResult>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub query: Option<String>,
}

fn default_format() -> String {
    "json".to_string()
}

/// `POST /export` response body.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Translates an API request into a [`SearchQuery`].
pub fn build_query(request: SearchRequest) -> Result<SearchQuery> {
    let transport = if request.use_tor {
        let mut config = TransportConfig::tor();
        config.verify_tls = request.proxy_verify_ssl;
        config
    } else if let Some(proxy) = request.proxy.as_deref().filter(|p| !p.is_empty()) {
        let mut config = TransportConfig::with_proxy_str(proxy)?;
        config.verify_tls = request.proxy_verify_ssl;
        config
    } else {
        TransportConfig::direct()
    };

    let mut query = SearchQuery::new(request.query)
        .with_engines(request.engines)
        .with_pages(request.pages)
        .with_safe_search(request.safe_search)
        .with_result_type(
            request
                .result_type
                .as_deref()
                .map(ResultKind::parse_lenient)
                .unwrap_or_default(),
        )
        .with_dedup(request.ignore_duplicates)
        .with_transport(transport);

    if let Some(language) = request.language.filter(|l| !l.is_empty()) {
        query = query.with_language(language);
    }
    if let Some(country) = request.country.filter(|c| !c.is_empty()) {
        query = query.with_country(country);
    }
    if let Some(kind) = request.filter {
        query = query.with_filter(ResultFilter::new(
            kind,
            request.filter_text.unwrap_or_default(),
        ));
    }
    Ok(query)
}

/// Rejects filenames that could escape the exports directory.
fn sanitize_filename(name: &str) -> Option<&str> {
    if name.is_empty()
        || name.contains(['/', '\\'])
        || name.contains("..")
        || name.starts_with('.')
    {
        return None;
    }
    Some(name)
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<SearchResponse>) {
    let query_text = request.query.clone();

    let query = match build_query(request) {
        Ok(query) => query,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SearchResponse::failure(query_text, err.to_string())),
            );
        }
    };

    match state.orchestrator.run(query).await {
        Ok(report) => {
            let engines = report.results.engines.clone();
            let query = report.results.query.clone();
            let results = report.results.into_items();
            (
                StatusCode::OK,
                Json(SearchResponse {
                    success: true,
                    total: results.len(),
                    results,
                    query,
                    engines,
                    statuses: report.statuses,
                    error: None,
                }),
            )
        }
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(SearchResponse::failure(query_text, err.to_string())),
        ),
    }
}

async fn export_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> (StatusCode, Json<ExportResponse>) {
    if request.results.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ExportResponse {
                success: false,
                filename: None,
                download_url: None,
                error: Some("No results to export".to_string()),
            }),
        );
    }

    let format = match ExportFormat::parse(&request.format) {
        Ok(format) => format,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ExportResponse {
                    success: false,
                    filename: None,
                    download_url: None,
                    error: Some(err.to_string()),
                }),
            );
        }
    };

    let mut set = SearchResultSet::new(
        request.query.unwrap_or_else(|| "search results".to_string()),
        Vec::new(),
    );
    for result in request.results {
        set.push(result);
    }

    match export::write_report(&set, format, &state.exports_dir) {
        Ok(path) => {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(ExportResponse {
                    success: true,
                    download_url: Some(format!("/download/{}", filename)),
                    filename: Some(filename),
                    error: None,
                }),
            )
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse {
                success: false,
                filename: None,
                download_url: None,
                error: Some(err.to_string()),
            }),
        ),
    }
}

async fn download_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    let Some(name) = sanitize_filename(&filename) else {
        return (StatusCode::BAD_REQUEST, "invalid filename").into_response();
    };
    match tokio::fs::read(state.exports_dir.join(name)).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "no such export").into_response(),
    }
}

async fn engines_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.registry.descriptors())
}

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", post(search_handler))
        .route("/export", post(export_handler))
        .route("/download/{filename}", get(download_handler))
        .route("/engines", get(engines_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds and serves the API until the process exits.
pub async fn serve(
    addr: SocketAddr,
    registry: Arc<EngineRegistry>,
    exports_dir: PathBuf,
) -> Result<()> {
    std::fs::create_dir_all(&exports_dir)?;
    let state = Arc::new(AppState::new(registry, exports_dir));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "search API listening");
    axum::serve(listener, app)
        .await
        .map_err(SearchError::Io)?;
    Ok(())
}
