//! Ask.com search engine backend.
//!
//! Ask renders its result list from a JSON state object embedded in an
//! inline script, so extraction recovers that blob instead of walking
//! result markup.

use regex::Regex;

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "ask",
    name: "Ask",
    base_url: "https://www.ask.com",
    paging: Paging::PageNumber,
    results_per_page: 10,
    tor_only: false,
    supports_language: false,
    supports_country: false,
    supports_safe_search: false,
    supports_result_type: false,
};

/// Ask backend: page-number pagination, embedded-state extraction.
pub struct Ask {
    state: Regex,
}

impl Ask {
    /// Creates a new Ask backend.
    pub fn new() -> Self {
        Self {
            state: Regex::new(r"window\.MESON\.initialState\s*=\s*(\{.+)").expect("valid regex"),
        }
    }
}

impl Default for Ask {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for Ask {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        let mut url = format!("{}/web?q={}", DESCRIPTOR.base_url, ctx.encoded_query());
        if page > 0 {
            url.push_str(&format!("&page={}", page + 1));
        }
        Some(PageRequest::get(url))
    }

    fn extract(&self, body: &str) -> Vec<EngineResult> {
        let Some(captures) = self.state.captures(body) else {
            return Vec::new();
        };
        let raw = captures[1].trim_end().trim_end_matches(';');
        let Ok(state) = serde_json::from_str::<serde_json::Value>(raw) else {
            return Vec::new();
        };

        let Some(entries) = state
            .pointer("/search/webResults/results")
            .and_then(|v| v.as_array())
        else {
            return Vec::new();
        };

        let mut results = Vec::new();
        for entry in entries {
            let url = entry
                .get("url")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if !url.starts_with("http") {
                continue;
            }
            let title = entry
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let snippet = entry
                .get("abstract")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            results.push(EngineResult::new(title, url, snippet, DESCRIPTOR.id));
        }
        results
    }
}
