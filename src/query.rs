//! Search query representation.

use serde::{Deserialize, Serialize};

use crate::transport::TransportConfig;

/// Safe search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// No filtering.
    Off,
    /// Moderate filtering.
    #[default]
    Moderate,
    /// Strict filtering.
    Strict,
}

/// Requested result vertical.
///
/// Engine-dependent: an engine that does not support the requested kind
/// silently searches its default vertical instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    #[default]
    All,
    News,
    Images,
    Videos,
}

impl ResultKind {
    /// Parses a result-type string; unsupported values degrade to `All`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "news" => ResultKind::News,
            "images" => ResultKind::Images,
            "videos" => ResultKind::Videos,
            _ => ResultKind::All,
        }
    }
}

/// Which result field an output filter matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Url,
    Title,
    Text,
    Host,
}

/// A declarative output filter applied after merging.
///
/// Matches are case-insensitive substring checks. An empty pattern
/// falls back to the query text at application time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFilter {
    pub kind: FilterKind,
    pub pattern: String,
}

impl ResultFilter {
    /// Creates a new filter.
    pub fn new(kind: FilterKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

/// A search query with all parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// The search terms.
    pub query: String,
    /// Engine identifiers to invoke, in attribution order.
    pub engines: Vec<String>,
    /// Number of result pages to fetch per engine (1-indexed count).
    pub pages: u32,
    /// Language code (e.g. "en", "de").
    pub language: Option<String>,
    /// Country code (e.g. "us", "fr").
    pub country: Option<String>,
    /// Safe search level.
    pub safe_search: SafeSearch,
    /// Requested result vertical.
    pub result_type: ResultKind,
    /// Optional output filter, applied after dedup.
    pub filter: Option<ResultFilter>,
    /// Remove cross-engine URL duplicates (first occurrence wins).
    pub dedup: bool,
    /// Transport configuration shared by all backends.
    pub transport: TransportConfig,
}

impl SearchQuery {
    /// Creates a new search query with the given terms.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            engines: Vec::new(),
            pages: 1,
            language: None,
            country: None,
            safe_search: SafeSearch::Moderate,
            result_type: ResultKind::All,
            filter: None,
            dedup: false,
            transport: TransportConfig::default(),
        }
    }

    /// Sets the engines to invoke.
    pub fn with_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engines = engines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the page count.
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages.max(1);
        self
    }

    /// Sets the language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the country code.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Sets the safe search level.
    pub fn with_safe_search(mut self, level: SafeSearch) -> Self {
        self.safe_search = level;
        self
    }

    /// Sets the requested result vertical.
    pub fn with_result_type(mut self, kind: ResultKind) -> Self {
        self.result_type = kind;
        self
    }

    /// Sets the output filter.
    pub fn with_filter(mut self, filter: ResultFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Enables or disables cross-engine URL dedup.
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Sets the transport configuration.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// The effective filter pattern: explicit pattern, or the query text.
    pub fn filter_pattern(&self) -> Option<(FilterKind, String)> {
        self.filter.as_ref().map(|f| {
            let pattern = if f.pattern.is_empty() {
                self.query.clone()
            } else {
                f.pattern.clone()
            };
            (f.kind, pattern)
        })
    }
}
