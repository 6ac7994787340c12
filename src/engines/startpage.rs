//! Startpage search engine backend.

use scraper::{Html, Selector};

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "startpage",
    name: "Startpage",
    base_url: "https://www.startpage.com",
    paging: Paging::PageNumber,
    results_per_page: 10,
    tor_only: false,
    supports_language: false,
    supports_country: false,
    supports_safe_search: false,
    supports_result_type: false,
};

/// Startpage backend: form-POST search with page-number pagination and
/// a dedicated blocked-feedback marker.
pub struct Startpage {
    links: Selector,
    title: Selector,
    snippet: Selector,
}

impl Startpage {
    /// Creates a new Startpage backend.
    pub fn new() -> Self {
        Self {
            links: Selector::parse("div.result").expect("valid selector"),
            title: Selector::parse("a.result-title, div.headline a").expect("valid selector"),
            snippet: Selector::parse("p.description").expect("valid selector"),
        }
    }
}

impl Default for Startpage {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for Startpage {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        let form = vec![
            ("query".to_string(), ctx.query.clone()),
            ("page".to_string(), (page + 1).to_string()),
        ];
        Some(PageRequest::post(
            format!("{}/sp/search", DESCRIPTOR.base_url),
            form,
        ))
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

    fn is_blocked(&self, status: u16, body: &str) -> bool {
        crate::engine::BLOCKING_STATUS.contains(&status)
            || body.contains("blocked_feedback_form")
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
            language: None,
            country: None,
            safe_search: SafeSearch::Moderate,
            result_type: ResultKind::All,
            transport: TransportConfig::direct().resolve().unwrap(),
            deadline: Instant::now() + Duration::from_secs(5),
        }
    }

    #[test]
    fn test_descriptor() {
        let engine = Startpage::new();
        assert_eq!(engine.descriptor().id, "startpage");
        assert_eq!(engine.descriptor().paging, Paging::PageNumber);
    }

    #[test]
    fn test_page_request_is_post_with_page_number() {
        let engine = Startpage::new();
        let request = engine.page_request(&context(), 0, None).unwrap();
        assert_eq!(request.url, "https://www.startpage.com/sp/search");
        let form = request.form.unwrap();
        assert!(form.contains(&("query".to_string(), "rust".to_string())));
        assert!(form.contains(&("page".to_string(), "1".to_string())));

        let request = engine.page_request(&context(), 2, None).unwrap();
        assert!(request.form.unwrap().contains(&("page".to_string(), "3".to_string())));
    }

    #[test]
    fn test_extract_results() {
        let html = r#"
            <html><body>
            <div class="result">
                <div class="headline"><a href="https://example.com/a">Result A</a></div>
                <p class="description">First description.</p>
            </div>
            <div class="result">
                <a class="result-title" href="https://example.com/b">Result B</a>
            </div>
            </body></html>
        "#;
        let results = Startpage::new().extract(html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Result A");
        assert_eq!(results[0].snippet, "First description.");
        assert_eq!(results[1].snippet, "");
        assert_eq!(results[1].engine, "startpage");
    }

    #[test]
    fn test_blocked_feedback_marker() {
        let engine = Startpage::new();
        assert!(engine.is_blocked(200, "<form id=\"blocked_feedback_form\"></form>"));
        assert!(engine.is_blocked(503, ""));
        assert!(!engine.is_blocked(200, "<div class=\"result\"></div>"));
    }
}
