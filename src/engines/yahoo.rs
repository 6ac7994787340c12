//! Yahoo search engine backend.

use scraper::{Html, Selector};

use crate::engine::{EngineBackend, EngineDescriptor, FetchedPage, PageRequest, Paging};
use crate::{EngineResult, SearchContext};

const DESCRIPTOR: EngineDescriptor = EngineDescriptor {
    id: "yahoo",
    name: "Yahoo",
    base_url: "https://search.yahoo.com",
    paging: Paging::QueryOffset,
    results_per_page: 10,
    tor_only: false,
    supports_language: true,
    supports_country: true,
    supports_safe_search: false,
    supports_result_type: false,
};

/// Yahoo backend: offset pagination via `b=`, `fr`/`vl` locale
/// parameters, and `/RU=` redirect unwrapping.
pub struct Yahoo;

impl Yahoo {
    /// Creates a new Yahoo backend.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Yahoo {
    fn default() -> Self {
        Self::new()
    }
}

/// `fr=`/`vl=` locale parameters shared by the Yahoo family (AOL runs
/// the same stack under a different host).
pub(crate) fn locale_params(ctx: &SearchContext) -> Vec<String> {
    let mut params = Vec::new();

    let fr = match (ctx.country.as_deref(), ctx.language.as_deref()) {
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
    if let Some(fr) = fr {
        params.push(format!("fr={}", fr));
    }

    if let Some(country) = ctx.country.as_deref() {
        let vl = match country {
            "ru" => Some("ru"),
            "by" => Some("by"),
            "kz" => Some("kz"),
            "ua" => Some("ua"),
            "us" => Some("us"),
            "gb" => Some("uk"),
            "de" => Some("de"),
            "fr" => Some("fr"),
            "es" => Some("es"),
            "it" => Some("it"),
            _ => None,
        };
        if let Some(vl) = vl {
            params.push(format!("vl=lang_{}", vl));
        }
    }

    params
}

/// Unwraps Yahoo's click-tracking redirect (`.../RU=<encoded>/RK=...`).
pub(crate) fn unwrap_redirect(url: &str) -> String {
    if let Some(tail) = url.split("/RU=").nth(1) {
        let encoded = tail.split("/R").next().unwrap_or(tail);
        if let Ok(decoded) = urlencoding::decode(encoded) {
            return decoded.into_owned();
        }
    }
    url.to_string()
}

/// Extracts results from Yahoo-family markup. Shared with [`Aol`].
///
/// [`Aol`]: crate::engines::Aol
pub(crate) fn extract_serp(body: &str, engine: &str) -> Vec<EngineResult> {
    let links = Selector::parse("div#web li div.dd.algo.algo-sr").expect("valid selector");
    let anchor = Selector::parse("div.compTitle a").expect("valid selector");
    let title = Selector::parse("div.compTitle h3.title").expect("valid selector");
    let text = Selector::parse("div.compText").expect("valid selector");

    let document = Html::parse_document(body);
    let mut results = Vec::new();

    for element in document.select(&links) {
        let Some(link) = element.select(&anchor).next() else {
            continue;
        };
        let raw_url = link.value().attr("href").unwrap_or_default();
        let url = unwrap_redirect(raw_url);
        if !url.starts_with("http") {
            continue;
        }
        let title = element
            .select(&title)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let snippet = element
            .select(&text)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(EngineResult::new(title, url, snippet, engine));
    }

    results
}

impl EngineBackend for Yahoo {
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
            "{}/search?p={}&ei=UTF-8&nojs=1",
            DESCRIPTOR.base_url,
            ctx.encoded_query()
        );
        if page > 0 {
            url.push_str(&format!("&b={}", page * 10 + 1));
        }
        for param in locale_params(ctx) {
            url.push('&');
            url.push_str(&param);
        }
        Some(PageRequest::get(url))
    }

    fn extract(&self, body: &str) -> Vec<EngineResult> {
        extract_serp(body, DESCRIPTOR.id)
    }
}
