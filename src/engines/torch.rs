//! Torch onion-service search backend.
//!
//! Torch only resolves over a TOR route; the shared pagination loop
//! rejects the invocation before any network call when the transport
//! cannot reach hidden services.

use scraper::{Html, Selector};

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "torch",
    name: "Torch",
    base_url: "http://xmh57jkjsvaltitnkkxkotcmsr3l775jjpk7wbipyenq4zoxibnqfxid.onion",
    paging: Paging::PageNumber,
    results_per_page: 10,
    tor_only: true,
    supports_language: false,
    supports_country: false,
    supports_safe_search: false,
    supports_result_type: false,
};

/// Torch backend.
pub struct Torch {
    links: Selector,
    title: Selector,
    snippet: Selector,
}

impl Torch {
    /// Creates a new Torch backend.
    pub fn new() -> Self {
        Self {
            links: Selector::parse("div.result").expect("valid selector"),
            title: Selector::parse("h5 a").expect("valid selector"),
            snippet: Selector::parse("p").expect("valid selector"),
        }
    }
}

impl Default for Torch {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for Torch {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        let mut url = format!("{}/search?query={}", DESCRIPTOR.base_url, ctx.encoded_query());
        if page > 0 {
            url.push_str(&format!("&page={}", page + 1));
        }
        Some(PageRequest::get(url))
    }

    fn extract(&self, body: &str) -> Vec<EngineResult> {
        let document = Html::parse_document(body);
        let mut results = Vec::new();

        for element in document.select(&self.links) {
            let Some(anchor) = element.select(&self.title).next() else {
                continue;
            };
            let url = anchor.value().attr("href").unwrap_or_default().to_string();
            if !url.starts_with("http") {
                continue;
            }
            let title = anchor.text().collect::<String>().trim().to_string();
            let snippet = element
                .select(&self.snippet)
                .next()
                .map(|e| e.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            results.push(EngineResult::new(title, url, snippet, DESCRIPTOR.id));
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineStatus;
    use crate::query::{ResultKind, SafeSearch};
    use crate::transport::TransportConfig;
    use std::time::Duration;
    use tokio::time::Instant;

    fn context(transport: TransportConfig) -> SearchContext {
        SearchContext {
            query: "hidden wiki".to_string(),
            pages: 1,
            language: None,
            country: None,
            safe_search: SafeSearch::Moderate,
            result_type: ResultKind::All,
            transport: transport.resolve().unwrap(),
            deadline: Instant::now() + Duration::from_secs(5),
        }
    }

    #[test]
    fn test_descriptor_is_tor_only() {
        let torch = Torch::new();
        assert!(torch.descriptor().tor_only);
        assert!(torch.descriptor().base_url.ends_with(".onion"));
    }

    #[test]
    fn test_page_request() {
        let torch = Torch::new();
        let ctx = context(TransportConfig::tor());
        let request = torch.page_request(&ctx, 0, None).unwrap();
        assert!(request.url.contains("/search?query=hidden%20wiki"));
        let request = torch.page_request(&ctx, 1, None).unwrap();
        assert!(request.url.ends_with("&page=2"));
    }

    #[tokio::test]
    async fn test_search_fails_fast_without_tor_route() {
        let torch = Torch::new();
        let outcome = torch.search(&context(TransportConfig::direct())).await;
        assert!(outcome.results.is_empty());
        match outcome.status {
            EngineStatus::Error(reason) => assert!(reason.contains("TOR")),
            other => panic!("expected error status, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_results() {
        let html = r#"
            <html><body>
            <div class="result">
                <h5><a href="http://example.onion/page">Onion Page</a></h5>
                <p>An onion service.</p>
            </div>
            </body></html>
        "#;
        let results = Torch::new().extract(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "http://example.onion/page");
        assert_eq!(results[0].engine, "torch");
    }
}
