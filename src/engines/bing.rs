//! Bing search engine backend.

use scraper::{Html, Selector};

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::query::{ResultKind, SafeSearch};
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "bing",
    name: "Bing",
    base_url: "https://www.bing.com",
    paging: Paging::QueryOffset,
    results_per_page: 10,
    tor_only: false,
    supports_language: true,
    supports_country: true,
    supports_safe_search: true,
    supports_result_type: true,
};

/// Bing backend: offset pagination via `first=`, market/language
/// parameters, and a news vertical.
pub struct Bing {
    links: Selector,
    title: Selector,
    snippet: Selector,
}

impl Bing {
    /// Creates a new Bing backend.
    pub fn new() -> Self {
        Self {
            links: Selector::parse("ol#b_results > li.b_algo").expect("valid selector"),
            title: Selector::parse("h2 a").expect("valid selector"),
            snippet: Selector::parse(".b_caption p, .b_algoSlug").expect("valid selector"),
        }
    }

    fn language_params(ctx: &SearchContext) -> Vec<String> {
        let mut params = Vec::new();

        let setlang = match (ctx.country.as_deref(), ctx.language.as_deref()) {
            (Some("ru") | Some("by") | Some("kz"), _) => Some("ru-RU"),
            (Some("ua"), _) => Some("uk-UA"),
            (_, Some("ru")) => Some("ru-RU"),
            (_, Some("de")) => Some("de-DE"),
            (_, Some("fr")) => Some("fr-FR"),
            (_, Some("es")) => Some("es-ES"),
            (_, Some("zh")) => Some("zh-CN"),
            (_, Some("ja")) => Some("ja-JP"),
            (_, Some("it")) => Some("it-IT"),
            _ => None,
        };
        if let Some(lang) = setlang {
            params.push(format!("setlang={}", lang));
        }

        if let Some(country) = ctx.country.as_deref() {
            let market = match country {
                "ru" => Some("ru-RU"),
                "by" => Some("by-BY"),
                "kz" => Some("kz-KZ"),
                "ua" => Some("uk-UA"),
                "us" => Some("en-US"),
                "gb" => Some("en-GB"),
                "de" => Some("de-DE"),
                "fr" => Some("fr-FR"),
                "es" => Some("es-ES"),
                "it" => Some("it-IT"),
                _ => None,
            };
            if let Some(market) = market {
                params.push(format!("mkt={}", market));
            }
        }

        match ctx.safe_search {
            SafeSearch::Strict => params.push("strict=1".to_string()),
            SafeSearch::Off => params.push("safeSearch=off".to_string()),
            SafeSearch::Moderate => {}
        }

        params
    }
}

impl Default for Bing {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBackend for Bing {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        // The news vertical is the only non-default kind Bing exposes
        // here; other kinds degrade to the web vertical.
        let path = if ctx.result_type == ResultKind::News {
            "news/search"
        } else {
            "search"
        };

        let mut url = format!(
            "{}/{}?q={}",
            DESCRIPTOR.base_url,
            path,
            ctx.encoded_query()
        );
        if page > 0 {
            url.push_str(&format!("&first={}", page * 10 + 1));
        }
        for param in Self::language_params(ctx) {
            url.push('&');
            url.push_str(&param);
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
    use crate::transport::TransportConfig;
    use std::time::Duration;
    use tokio::time::Instant;

    fn context() -> SearchContext {
        SearchContext {
            query: "rust language".to_string(),
            pages: 2,
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
        let bing = Bing::new();
        let descriptor = bing.descriptor();
        assert_eq!(descriptor.id, "bing");
        assert_eq!(descriptor.paging, Paging::QueryOffset);
        assert!(descriptor.supports_paging());
        assert!(!descriptor.tor_only);
    }

    #[test]
    fn test_first_page_request() {
        let bing = Bing::new();
        let request = bing.page_request(&context(), 0, None).unwrap();
        assert_eq!(
            request.url,
            "https://www.bing.com/search?q=rust%20language"
        );
        assert!(request.form.is_none());
    }

    #[test]
    fn test_second_page_offset() {
        let bing = Bing::new();
        let request = bing.page_request(&context(), 1, None).unwrap();
        assert!(request.url.contains("first=11"));
        let request = bing.page_request(&context(), 2, None).unwrap();
        assert!(request.url.contains("first=21"));
    }

    #[test]
    fn test_language_and_market_params() {
        let mut ctx = context();
        ctx.language = Some("de".to_string());
        ctx.country = Some("de".to_string());
        let bing = Bing::new();
        let request = bing.page_request(&ctx, 0, None).unwrap();
        assert!(request.url.contains("setlang=de-DE"));
        assert!(request.url.contains("mkt=de-DE"));
    }

    #[test]
    fn test_safe_search_params() {
        let bing = Bing::new();
        let mut ctx = context();

        ctx.safe_search = SafeSearch::Strict;
        assert!(bing
            .page_request(&ctx, 0, None)
            .unwrap()
            .url
            .contains("strict=1"));

        ctx.safe_search = SafeSearch::Off;
        assert!(bing
            .page_request(&ctx, 0, None)
            .unwrap()
            .url
            .contains("safeSearch=off"));

        ctx.safe_search = SafeSearch::Moderate;
        let url = bing.page_request(&ctx, 0, None).unwrap().url;
        assert!(!url.contains("strict"));
        assert!(!url.contains("safeSearch"));
    }

    #[test]
    fn test_news_vertical() {
        let mut ctx = context();
        ctx.result_type = ResultKind::News;
        let request = Bing::new().page_request(&ctx, 0, None).unwrap();
        assert!(request.url.starts_with("https://www.bing.com/news/search?q="));
    }

    #[test]
    fn test_unsupported_vertical_degrades_to_web() {
        let mut ctx = context();
        ctx.result_type = ResultKind::Videos;
        let request = Bing::new().page_request(&ctx, 0, None).unwrap();
        assert!(request.url.starts_with("https://www.bing.com/search?q="));
    }

    #[test]
    fn test_extract_results() {
        let html = r#"
            <html><body><ol id="b_results">
            <li class="b_algo">
                <h2><a href="https://example.com/rust">Rust Example</a></h2>
                <div class="b_caption"><p>A snippet about Rust.</p></div>
            </li>
            <li class="b_algo">
                <h2><a href="javascript:void(0)">Skipped</a></h2>
            </li>
            </ol></body></html>
        "#;
        let results = Bing::new().extract(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Rust Example");
        assert_eq!(results[0].url, "https://example.com/rust");
        assert_eq!(results[0].snippet, "A snippet about Rust.");
        assert_eq!(results[0].engine, "bing");
    }

    #[test]
    fn test_extract_missing_snippet_is_empty() {
        let html = r#"
            <html><body><ol id="b_results">
            <li class="b_algo"><h2><a href="https://a.com">T</a></h2></li>
            </ol></body></html>
        "#;
        let results = Bing::new().extract(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].snippet, "");
    }

    #[test]
    fn test_extract_empty_page() {
        assert!(Bing::new().extract("<html><body></body></html>").is_empty());
    }
}
