//! DuckDuckGo search engine backend (html.duckduckgo.com endpoint).

use scraper::{Html, Selector};

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::query::SafeSearch;
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "duckduckgo",
    name: "DuckDuckGo",
    base_url: "https://html.duckduckgo.com/html/",
    paging: Paging::QueryOffset,
    results_per_page: 30,
    tor_only: false,
    supports_language: true,
    supports_country: true,
    supports_safe_search: true,
    supports_result_type: false,
};

/// DuckDuckGo backend: form-POST endpoint with `kl` locale, `kp`
/// safe-search and `s` result offset.
pub struct DuckDuckGo {
    links: Selector,
    title: Selector,
    snippet: Selector,
}

impl DuckDuckGo {
    /// Creates a new DuckDuckGo backend.
    pub fn new() -> Self {
        Self {
            links: Selector::parse("div.results div.result").expect("valid selector"),
            title: Selector::parse("h2.result__title a").expect("valid selector"),
            snippet: Selector::parse("a.result__snippet").expect("valid selector"),
        }
    }

    fn locale(ctx: &SearchContext) -> &'static str {
        if let Some(country) = ctx.country.as_deref() {
            match country {
                "ru" => return "ru-ru",
                "by" => return "ru-by",
                "kz" => return "ru-kz",
                "ua" => return "uk-ua",
                "us" => return "us-en",
                "gb" => return "uk-en",
                "de" => return "de-de",
                "fr" => return "fr-fr",
                "es" => return "es-es",
                "it" => return "it-it",
                "cn" => return "cn-zh",
                "jp" => return "jp-jp",
                _ => {}
            }
        }
        if let Some(language) = ctx.language.as_deref() {
            match language {
                "ru" => return "ru-ru",
                "de" => return "de-de",
                "fr" => return "fr-fr",
                "es" => return "es-es",
                "it" => return "it-it",
                "zh" => return "cn-zh",
                "ja" => return "jp-jp",
                _ => {}
            }
        }
        "us-en"
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new()
    }
}

/// Unwraps the `uddg=` redirect links the html endpoint emits.
fn unwrap_redirect(url: &str) -> Option<String> {
    let encoded = url.split("uddg=").nth(1)?;
    let decoded = urlencoding::decode(encoded).ok()?;
    let end = decoded.find('&').unwrap_or(decoded.len());
    Some(decoded[..end].to_string())
}

impl EngineBackend for DuckDuckGo {
    fn descriptor(&self) -> &EngineDescriptor {
        &DESCRIPTOR
    }

    fn page_request(
        &self,
        ctx: &SearchContext,
        page: u32,
        _prev: Option<&FetchedPage>,
    ) -> Option<PageRequest> {
        let mut form = vec![
            ("q".to_string(), ctx.query.clone()),
            ("kl".to_string(), Self::locale(ctx).to_string()),
        ];
        if page == 0 {
            form.push(("b".to_string(), String::new()));
        } else {
            form.push(("s".to_string(), (page * 30).to_string()));
        }
        match ctx.safe_search {
            SafeSearch::Strict => form.push(("kp".to_string(), "1".to_string())),
            SafeSearch::Off => form.push(("kp".to_string(), "-2".to_string())),
            SafeSearch::Moderate => {}
        }
        Some(PageRequest::post(DESCRIPTOR.base_url, form))
    }

    fn extract(&self, body: &str) -> Vec<EngineResult> {
        let document = Html::parse_document(body);
        let mut results = Vec::new();

        for element in document.select(&self.links) {
            let Some(anchor) = element.select(&self.title).next() else {
                continue;
            };
            let raw = anchor.value().attr("href").unwrap_or_default();
            let url = if raw.contains("duckduckgo.com/l/") {
                unwrap_redirect(raw).unwrap_or_else(|| raw.to_string())
            } else {
                raw.to_string()
            };
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
        crate::engine::BLOCKING_STATUS.contains(&status) || body.contains("anomaly-modal")
    }
}
