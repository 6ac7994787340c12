//! Search orchestration.
//!
//! Dispatches a query to every selected engine backend concurrently,
//! isolates per-backend failures (timeouts, blocks, transport errors,
//! panics), buffers each backend's full output, and merges in
//! engine-request order — completion order never influences the final
//! sequence. The caller always gets a status entry for every requested
//! engine identifier, known or not.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::engine::{EngineBackend, EngineOutcome, EngineStatus, SearchContext};
use crate::query::FilterKind;
use crate::registry::EngineRegistry;
use crate::{merge, Result, SearchError, SearchQuery, SearchResultSet};

/// Extra time granted to a backend task past its deadline before the
/// orchestrator gives up on joining it. Backends respect the deadline
/// between pagination steps; the grace period only backstops tasks
/// stuck inside a single call.
const JOIN_GRACE: Duration = Duration::from_millis(500);

/// Drives a single engine's fetch on its own task with a deadline and
/// join grace, converting every failure mode into an [`EngineOutcome`].
async fn run_engine_job(
    id: String,
    backend: Arc<dyn EngineBackend>,
    mut ctx: SearchContext,
    budget: Duration,
) -> (String, EngineOutcome) {
    ctx.deadline = Instant::now() + budget;
    let task = tokio::spawn(async move { backend.search(&ctx).await });
    let outcome = match tokio::time::timeout(budget + JOIN_GRACE, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) if join_err.is_panic() => {
            warn!(engine = %id, "backend panicked during extraction");
            EngineOutcome::failed("panicked during extraction")
        }
        Ok(Err(_)) => EngineOutcome::failed("task cancelled"),
        Err(_) => EngineOutcome::failed("timeout"),
    };
    (id, outcome)
}

/// Final results plus per-engine diagnostics of one search invocation.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Merged, filtered result set.
    pub results: SearchResultSet,
    /// Terminal status of every requested engine identifier.
    pub statuses: BTreeMap<String, EngineStatus>,
}

/// Meta search orchestrator over an immutable engine registry.
pub struct Orchestrator {
    registry: Arc<EngineRegistry>,
    engine_timeout: Duration,
    max_concurrency: Option<usize>,
}

impl Orchestrator {
    /// Creates an orchestrator over the given registry.
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self {
            registry,
            engine_timeout: Duration::from_secs(10),
            max_concurrency: None,
        }
    }

    /// Sets the per-engine time budget (whole pagination sequence).
    pub fn with_engine_timeout(mut self, timeout: Duration) -> Self {
        self.engine_timeout = timeout;
        self
    }

    /// Caps the number of backends fetching at once. Defaults to the
    /// number of selected engines.
    pub fn with_max_concurrency(mut self, cap: usize) -> Self {
        self.max_concurrency = Some(cap.max(1));
        self
    }

    /// Runs a search across all requested engines.
    ///
    /// Configuration errors (empty query, no engines, invalid
    /// transport) fail fast before any network call. Everything else —
    /// unknown identifiers, blocks, timeouts, panicking extractors —
    /// is recorded per engine in the returned status map.
    pub async fn run(&self, query: SearchQuery) -> Result<SearchReport> {
        if query.query.trim().is_empty() {
            return Err(SearchError::Config("query must not be empty".into()));
        }
        if query.engines.is_empty() {
            return Err(SearchError::Config("no engines selected".into()));
        }

        let transport = query.transport.resolve()?;

        // Proxied routes get extra headroom for the slower round trips.
        let budget = if query.transport.effective_proxy().is_some() {
            self.engine_timeout + Duration::from_secs(10)
        } else {
            self.engine_timeout
        };

        let mut statuses: BTreeMap<String, EngineStatus> = BTreeMap::new();
        let mut jobs: Vec<(String, Arc<dyn EngineBackend>)> = Vec::new();
        for id in &query.engines {
            if jobs.iter().any(|(known, _)| known == id) {
                continue;
            }
            match self.registry.get(id) {
                Some(backend) => jobs.push((id.clone(), backend)),
                None => {
                    warn!(engine = %id, "unknown engine identifier");
                    statuses.insert(id.clone(), EngineStatus::UnknownEngine);
                }
            }
        }

        let cap = self.max_concurrency.unwrap_or(jobs.len()).max(1);
        debug!(
            engines = jobs.len(),
            cap,
            budget_ms = budget.as_millis() as u64,
            "dispatching search"
        );

        let context = SearchContext {
            query: query.query.clone(),
            pages: query.pages.max(1),
            language: query.language.clone(),
            country: query.country.clone(),
            safe_search: query.safe_search,
            result_type: query.result_type,
            transport,
            // Placeholder; each task gets its own deadline at spawn time.
            deadline: Instant::now(),
        };

        // `buffered` preserves input order, so the collected outcomes
        // line up with engine-request order regardless of which fetch
        // finishes first.
        let job_futs: Vec<_> = jobs
            .into_iter()
            .map(|(id, backend)| run_engine_job(id, backend, context.clone(), budget))
            .collect();
        let outcomes: Vec<(String, EngineOutcome)> = stream::iter(job_futs)
            .buffered(cap)
            .collect()
            .await;

        let mut engine_lists = Vec::with_capacity(outcomes.len());
        for (id, outcome) in outcomes {
            debug!(
                engine = %id,
                status = outcome.status.as_str(),
                results = outcome.results.len(),
                "engine finished"
            );
            statuses.insert(id.clone(), outcome.status);
            engine_lists.push((id, outcome.results));
        }

        let mut results = merge::merge(&query.query, engine_lists, query.dedup);

        if let Some((kind, pattern)) = query.filter_pattern() {
            let needle = pattern.to_lowercase();
            results.retain(|r| match kind {
                FilterKind::Url => r.url.to_lowercase().contains(&needle),
                FilterKind::Title => r.title.to_lowercase().contains(&needle),
                FilterKind::Text => r.snippet.to_lowercase().contains(&needle),
                FilterKind::Host => r.host().contains(&needle),
            });
        }

        Ok(SearchReport { results, statuses })
    }
}
