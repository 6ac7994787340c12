//! AOL search engine backend.
//!
//! AOL search runs the Yahoo stack under its own host, so the markup
//! and locale parameters are shared with the Yahoo backend.

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::{EngineResult, SearchContext};

use super::yahoo;

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "aol",
    name: "AOL",
    base_url: "https://search.aol.com",
    paging: Paging::QueryOffset,
    results_per_page: 10,
    tor_only: false,
    supports_language: true,
    supports_country: true,
    supports_safe_search: false,
    supports_result_type: false,
};

/// AOL backend.
pub struct Aol;

impl Aol {
    /// Creates a new AOL backend.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Aol {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for Aol {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        let mut url = format!(
            "{}/aol/search?q={}&ei=UTF-8&nojs=1",
            DESCRIPTOR.base_url,
            ctx.encoded_query()
        );
        if page > 0 {
            url.push_str(&format!("&b={}", page * 10 + 1));
        }
        for param in yahoo::locale_params(ctx) {
            url.push('&');
            url.push_str(&param);
        }
        Some(PageRequest::get(url))
    }

    fn extract(&self, body: &str) -> Vec<EngineResult> {
        yahoo::extract_serp(body, DESCRIPTOR.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ResultKind, SafeSearch};
    use crate::transport::TransportConfig;
    use std::time::Duration;
    use tokio::time::Instant;

    fn context() -> SearchContext {
        SearchContext {
            query: "rust".to_string(),
            pages: 1,
            language: Some("de".to_string()),
            country: None,
            safe_search: SafeSearch::Moderate,
            result_type: ResultKind::All,
            transport: TransportConfig::direct().resolve().unwrap(),
            deadline: Instant::now() + Duration::from_secs(5),
        }
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(Aol::new().descriptor().id, "aol");
        assert_eq!(Aol::new().descriptor().base_url, "https://search.aol.com");
    }

    #[test]
    fn test_first_page_request_uses_aol_path() {
        let request = Aol::new().page_request(&context(), 0, None).unwrap();
        assert!(request
            .url
            .starts_with("https://search.aol.com/aol/search?q=rust"));
        assert!(request.url.contains("fr=de-DE"));
    }

    #[test]
    fn test_offset_pagination() {
        let request = Aol::new().page_request(&context(), 1, None).unwrap();
        assert!(request.url.contains("&b=11"));
    }

    #[test]
    fn test_extract_attributes_to_aol() {
        let html = r#"
            <html><body><div id="web"><ul><li>
            <div class="dd algo algo-sr">
                <div class="compTitle">
                    <h3 class="title">Hit</h3>
                    <a href="https://example.com/page">link</a>
                </div>
                <div class="compText">snippet</div>
            </div>
            </li></ul></div></body></html>
        "#;
        let results = Aol::new().extract(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].engine, "aol");
    }
}
