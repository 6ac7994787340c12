//! Engine backend contract.
//!
//! Each search engine implements [`EngineBackend`]: static metadata in
//! an [`EngineDescriptor`], a request builder per result page, and an
//! extraction rule turning a response body into normalized results.
//! The provided [`EngineBackend::search`] loop drives pagination with
//! the shared transport and converts every failure mode into an
//! [`EngineOutcome`] — errors never cross the task boundary.

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::Instant;

use crate::query::{ResultKind, SafeSearch};
use crate::transport::{accept_language, Transport};
use crate::{EngineResult, SearchError};

/// HTTP statuses treated as a block/ban signal by every engine.
pub const BLOCKING_STATUS: [u16; 3] = [403, 429, 503];

/// Pagination strategy advertised by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Paging {
    /// Result offset carried in a query parameter (e.g. `first=11`).
    QueryOffset,
    /// Page number carried in a query parameter (e.g. `page=2`).
    PageNumber,
    /// Only the first page is reachable.
    Single,
}

/// Static, per-engine metadata. Built once at process start as part of
/// the registry; never mutated at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct EngineDescriptor {
    /// Registry identifier (e.g. "bing").
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Base URL all page requests derive from.
    pub base_url: &'static str,
    /// Pagination strategy.
    pub paging: Paging,
    /// Typical number of results per page, used as a soft cap.
    pub results_per_page: usize,
    /// Engine is only reachable over a TOR route.
    pub tor_only: bool,
    /// Engine honors a language preference.
    pub supports_language: bool,
    /// Engine honors a country preference.
    pub supports_country: bool,
    /// Engine honors a safe-search level.
    pub supports_safe_search: bool,
    /// Engine honors a result-type vertical.
    pub supports_result_type: bool,
}

impl EngineDescriptor {
    /// Whether more than one page can be requested.
    pub fn supports_paging(&self) -> bool {
        self.paging != Paging::Single
    }
}

/// One page-fetch request: a GET URL or a POST with form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub form: Option<Vec<(String, String)>>,
}

impl PageRequest {
    /// A GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            form: None,
        }
    }

    /// A POST request with form fields.
    pub fn post(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            form: Some(form),
        }
    }
}

/// A fetched response page, fed back into the next `page_request` call.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    pub url: String,
}

/// Terminal status of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Completed, possibly with zero results.
    Ok,
    /// The engine signalled a block/CAPTCHA condition.
    Blocked,
    /// Transport failure, timeout, panic or pre-flight config error.
    Error(String),
    /// The requested identifier is not in the registry.
    UnknownEngine,
}

impl EngineStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineStatus::Ok => "ok",
            EngineStatus::Blocked => "blocked",
            EngineStatus::Error(_) => "error",
            EngineStatus::UnknownEngine => "unknown_engine",
        }
    }

    /// Failure reason, when one was recorded.
    pub fn reason(&self) -> Option<&str> {
        match self {
            EngineStatus::Error(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Serialize for EngineStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Results plus terminal status of one engine invocation.
///
/// Results harvested before a block or timeout are kept; the status
/// records how the engine finished.
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub results: Vec<EngineResult>,
    pub status: EngineStatus,
}

impl EngineOutcome {
    pub fn ok(results: Vec<EngineResult>) -> Self {
        Self {
            results,
            status: EngineStatus::Ok,
        }
    }

    pub fn blocked(results: Vec<EngineResult>) -> Self {
        Self {
            results,
            status: EngineStatus::Blocked,
        }
    }

    pub fn error(results: Vec<EngineResult>, reason: impl Into<String>) -> Self {
        Self {
            results,
            status: EngineStatus::Error(reason.into()),
        }
    }

    /// Pre-flight failure: nothing was fetched.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::error(Vec::new(), reason)
    }
}

/// Per-invocation context shared read-only with a backend.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Raw query text.
    pub query: String,
    /// Requested page count.
    pub pages: u32,
    /// Language code, if any.
    pub language: Option<String>,
    /// Country code, if any.
    pub country: Option<String>,
    /// Safe-search level.
    pub safe_search: SafeSearch,
    /// Requested result vertical.
    pub result_type: ResultKind,
    /// Resolved transport, shared across all backends.
    pub transport: Transport,
    /// Absolute deadline for this engine's whole pagination budget.
    pub deadline: Instant,
}

impl SearchContext {
    /// URL-encoded query text.
    pub fn encoded_query(&self) -> String {
        urlencoding::encode(&self.query).into_owned()
    }
}

/// Contract every engine backend satisfies.
///
/// Implementations provide the descriptor, the per-page request
/// builder, and the extraction rule; the pagination loop is shared.
/// Adding an engine means adding one implementation and registering
/// it — the orchestrator never changes.
#[async_trait]
pub trait EngineBackend: Send + Sync {
    /// Static engine metadata.
    fn descriptor(&self) -> &EngineDescriptor;

    /// Builds the request for `page` (0-based). `prev` holds the page
    /// fetched before, for engines that derive the next request from
    /// response state. Returning `None` ends pagination.
    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        prev: Option<&FetchedPage>,
    ) -> Option<PageRequest>;

    /// Extracts normalized results from one response body. Malformed
    /// entries are skipped; missing titles/snippets become empty
    /// strings rather than failing the page.
    fn extract(&self, body: &str) -> Vec<EngineResult>;

    /// Whether the response signals a block/CAPTCHA condition.
    fn is_blocked(&self, status: u16, body: &str) -> bool {
        let _ = body;
        BLOCKING_STATUS.contains(&status)
    }

    /// Runs the paginated fetch sequence.
    ///
    /// Terminates on: exhausted page budget, an empty page, a block
    /// signal, a transport error, or the context deadline. Pages
    /// harvested before the terminating condition are kept.
    async fn search(&self, ctx: &SearchContext) -> EngineOutcome {
        let descriptor = self.descriptor();

        if descriptor.tor_only && !ctx.transport.tor_capable() {
            return EngineOutcome::failed("TOR transport required but not configured");
        }

        let pages = if descriptor.supports_paging() {
            ctx.pages.max(1)
        } else {
            1
        };

        let mut results = Vec::new();
        let mut prev: Option<FetchedPage> = None;

        for page in 0..pages {
            let Some(request) = self.page_request(ctx, page, prev.as_ref()) else {
                break;
            };

            let fetched = match fetch_page(ctx, &request).await {
                Ok(fetched) => fetched,
                Err(err) => {
                    tracing::warn!(
                        engine = descriptor.id,
                        page,
                        error = %err,
                        "page fetch failed"
                    );
                    let reason = match &err {
                        SearchError::Transport(reason) => reason.clone(),
                        other => other.to_string(),
                    };
                    return EngineOutcome::error(results, reason);
                }
            };

            if self.is_blocked(fetched.status, &fetched.body) {
                tracing::warn!(
                    engine = descriptor.id,
                    status = fetched.status,
                    "engine signalled a block"
                );
                return EngineOutcome::blocked(results);
            }

            let hits = self.extract(&fetched.body);
            tracing::debug!(engine = descriptor.id, page, hits = hits.len(), "page parsed");
            if hits.is_empty() {
                break;
            }
            results.extend(hits);
            prev = Some(fetched);
        }

        EngineOutcome::ok(results)
    }
}

/// Issues one page fetch through the shared transport, bounded by the
/// context deadline.
pub async fn fetch_page(
    ctx: &SearchContext,
    request: &PageRequest,
) -> crate::Result<FetchedPage> {
    let client = ctx.transport.client();

    let builder = match &request.form {
        Some(form) => client.post(&request.url).form(form),
        None => client.get(&request.url),
    };
    let builder = builder.header(
        reqwest::header::ACCEPT_LANGUAGE,
        accept_language(ctx.language.as_deref()),
    );

    let send = async {
        let response = builder
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(FetchedPage {
            status,
            body,
            url: request.url.clone(),
        })
    };

    match tokio::time::timeout_at(ctx.deadline, send).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Transport("timeout".into())),
    }
}
