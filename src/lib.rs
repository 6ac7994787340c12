//! # quarry
//!
//! A multi-engine web search scraper. Quarry dispatches one query to
//! several search engines concurrently, normalizes each engine's result
//! pages into uniform records, merges and deduplicates across engines
//! in deterministic request order, and exposes the merged set through
//! a CLI, an HTTP API and an export pipeline.
//!
//! Per-engine failures never abort a search: blocks, timeouts and
//! transport errors are reported in a per-engine status map alongside
//! the results of the engines that did answer.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quarry::{EngineRegistry, Orchestrator, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(EngineRegistry::builtin());
//!     let orchestrator = Orchestrator::new(registry);
//!
//!     let query = SearchQuery::new("rust programming")
//!         .with_engines(["bing", "duckduckgo"])
//!         .with_dedup(true);
//!     let report = orchestrator.run(query).await?;
//!
//!     for result in report.results.items() {
//!         println!("[{}] {}: {}", result.engine, result.title, result.url);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod orchestrator;
mod query;
mod registry;
mod result;

pub mod engine;
pub mod engines;
pub mod export;
pub mod merge;
pub mod server;
pub mod transport;

pub use engine::{EngineBackend, EngineDescriptor, EngineOutcome, EngineStatus, SearchContext};
pub use error::{Result, SearchError};
pub use orchestrator::{Orchestrator, SearchReport};
pub use query::{FilterKind, ResultFilter, ResultKind, SafeSearch, SearchQuery};
pub use registry::EngineRegistry;
pub use result::{EngineResult, SearchResultSet};
