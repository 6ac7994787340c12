//! Error types for the search library.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations.
///
/// Only `Config` is fatal to a whole search request: it is detected
/// before any network call runs. Everything else is recovered at the
/// engine or single-result level and surfaced through the per-engine
/// status map instead of aborting sibling engines.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Invalid configuration (bad proxy string, empty query, no engines).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure: connection, DNS, TLS or timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with a block/CAPTCHA signature.
    #[error("Engine '{0}' blocked the request")]
    Blocked(String),

    /// Failed to parse a response page.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Requested engine identifier is not in the registry.
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Export file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SearchError {
    /// Returns true for errors detected before any network call.
    pub fn is_config(&self) -> bool {
        matches!(self, SearchError::Config(_))
    }
}
