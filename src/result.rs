//! Normalized search result types.

use serde::{Deserialize, Serialize};

/// One normalized hit from a search engine.
///
/// Created while parsing a response page and immutable afterwards.
/// `title` and `snippet` may be empty when the source page omits them;
/// `url` is always present and `engine` traces provenance through
/// merging and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Result title (may be empty).
    #[serde(default)]
    pub title: String,
    /// Result URL.
    #[serde(alias = "link")]
    pub url: String,
    /// Snippet/description text (may be empty).
    #[serde(default, alias = "text", alias = "description")]
    pub snippet: String,
    /// Identifier of the engine that produced this hit.
    pub engine: String,
}

impl EngineResult {
    /// Creates a new result.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            engine: engine.into(),
        }
    }

    /// The host part of the result URL, lowercased. Empty when the URL
    /// does not parse as an absolute URL.
    pub fn host(&self) -> String {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default()
    }
}

/// Ordered, merged results of one search invocation.
///
/// Ordering follows engine-request order (the orchestrator buffers and
/// concatenates; completion order never leaks into the sequence).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResultSet {
    results: Vec<EngineResult>,
    /// The originating query text.
    pub query: String,
    /// Engines actually invoked (requested minus unknown identifiers).
    pub engines: Vec<String>,
}

impl SearchResultSet {
    /// Creates an empty result set for a query.
    pub fn new(query: impl Into<String>, engines: Vec<String>) -> Self {
        Self {
            results: Vec::new(),
            query: query.into(),
            engines,
        }
    }

    /// Appends a result, preserving insertion order.
    pub fn push(&mut self, result: EngineResult) {
        self.results.push(result);
    }

    /// Returns the results in order.
    pub fn items(&self) -> &[EngineResult] {
        &self.results
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Keeps only results matching the predicate, preserving order.
    pub fn retain<F: FnMut(&EngineResult) -> bool>(&mut self, f: F) {
        self.results.retain(f);
    }

    /// Consumes the set, returning the underlying results.
    pub fn into_items(self) -> Vec<EngineResult> {
        self.results
    }
}
