//! Dedup & merge engine.
//!
//! Combines per-engine result lists into one ordered sequence. The
//! input lists arrive in engine-request order (the orchestrator buffers
//! them; completion order never reaches this module), so merging is a
//! stable concatenation. Deduplication compares canonicalized URLs and
//! keeps the first occurrence with its original engine attribution.

use std::collections::HashSet;

use url::Url;

use crate::{EngineResult, SearchResultSet};

/// Tracking query parameters stripped during normalization.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "feature",
];

/// Canonicalizes a URL for deduplication comparison.
///
/// The fixed normalization rule:
///
/// 1. Lowercase scheme and host (parser-canonical).
/// 2. Drop the fragment.
/// 3. Drop default ports (`:80` for http, `:443` for https).
/// 4. Drop the trailing path slash, except for the root path `/`.
/// 5. Strip known tracking parameters (UTM family, fbclid, gclid, ...),
///    matching keys case-insensitively.
/// 6. Sort remaining query pairs by key, then value.
///
/// Inputs that do not parse as absolute URLs normalize to themselves,
/// so they only ever deduplicate against byte-identical strings.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let query: String = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&query));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    parsed.to_string()
}

fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}

/// Merges per-engine result lists into one [`SearchResultSet`].
///
/// `engine_lists` must be ordered by engine-request position. With
/// `dedup`, a result whose normalized URL was already emitted by an
/// earlier list (or earlier in the same list) is dropped — first
/// occurrence wins and keeps its attribution. Without `dedup`, every
/// result is preserved, including exact duplicates within one engine.
pub fn merge(
    query: &str,
    engine_lists: Vec<(String, Vec<EngineResult>)>,
    dedup: bool,
) -> SearchResultSet {
    let engines: Vec<String> = engine_lists.iter().map(|(id, _)| id.clone()).collect();
    let mut set = SearchResultSet::new(query, engines);

    let mut seen: HashSet<String> = HashSet::new();
    for (_, results) in engine_lists {
        for result in results {
            if dedup && !seen.insert(normalize_url(&result.url)) {
                continue;
            }
            set.push(result);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(url: &str, engine: &str) -> EngineResult {
        EngineResult::new(format!("title {engine}"), url, "", engine)
    }

    #[test]
    fn normalize_lowercases_scheme_and_host() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn normalize_removes_trailing_slash() {
        assert_eq!(
            normalize_url("https://example.com/path/"),
            "https://example.com/path"
        );
    }

    #[test]
    fn normalize_preserves_root_slash() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn normalize_removes_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/a"),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:443/a"),
            "https://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/a"),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn normalize_sorts_query_pairs() {
        assert_eq!(
            normalize_url("https://example.com/s?z=1&a=2&m=3"),
            "https://example.com/s?a=2&m=3&z=1"
        );
    }

    #[test]
    fn normalize_strips_tracking_params() {
        assert_eq!(
            normalize_url("https://example.com/p?q=rust&utm_source=x&fbclid=y&gclid=z"),
            "https://example.com/p?q=rust"
        );
    }

    #[test]
    fn normalize_drops_fragment() {
        assert_eq!(
            normalize_url("https://example.com/p#section"),
            "https://example.com/p"
        );
    }

    #[test]
    fn normalize_equivalent_urls_agree() {
        let a = normalize_url("https://Example.COM/path/?b=2&a=1#frag");
        let b = normalize_url("https://example.com/path?a=1&b=2");
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_invalid_url_unchanged() {
        assert_eq!(normalize_url("not a url"), "not a url");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn merge_concatenates_in_request_order() {
        let lists = vec![
            (
                "bing".to_string(),
                vec![hit("https://a.com", "bing"), hit("https://b.com", "bing")],
            ),
            ("yahoo".to_string(), vec![hit("https://c.com", "yahoo")]),
        ];
        let set = merge("q", lists, false);
        assert_eq!(set.engines, vec!["bing", "yahoo"]);
        let urls: Vec<_> = set.items().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn merge_without_dedup_preserves_exact_duplicates() {
        let lists = vec![(
            "bing".to_string(),
            vec![hit("https://a.com", "bing"), hit("https://a.com", "bing")],
        )];
        let set = merge("q", lists, false);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn merge_dedup_first_engine_wins() {
        let lists = vec![
            ("bing".to_string(), vec![hit("https://a.com/page", "bing")]),
            (
                "yahoo".to_string(),
                vec![
                    hit("https://a.com/page/", "yahoo"),
                    hit("https://b.com", "yahoo"),
                ],
            ),
        ];
        let set = merge("q", lists, true);
        assert_eq!(set.len(), 2);
        assert_eq!(set.items()[0].engine, "bing");
        assert_eq!(set.items()[1].engine, "yahoo");
    }

    #[test]
    fn merge_dedup_within_one_engine() {
        let lists = vec![(
            "bing".to_string(),
            vec![
                hit("https://a.com?utm_source=feed", "bing"),
                hit("https://a.com", "bing"),
            ],
        )];
        let set = merge("q", lists, true);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn merge_dedup_is_idempotent() {
        let lists = vec![
            (
                "bing".to_string(),
                vec![hit("https://a.com", "bing"), hit("https://b.com/", "bing")],
            ),
            (
                "yahoo".to_string(),
                vec![hit("https://b.com", "yahoo"), hit("https://c.com", "yahoo")],
            ),
        ];
        let once = merge("q", lists, true);
        let relisted = vec![("merged".to_string(), once.items().to_vec())];
        let twice = merge("q", relisted, true);
        assert_eq!(once.items(), twice.items());
    }

    #[test]
    fn merge_dedup_count_bounds() {
        let lists = vec![
            (
                "bing".to_string(),
                vec![hit("https://a.com", "bing"), hit("https://b.com", "bing")],
            ),
            (
                "yahoo".to_string(),
                vec![hit("https://a.com", "yahoo"), hit("https://c.com", "yahoo")],
            ),
        ];
        let total: usize = lists.iter().map(|(_, l)| l.len()).sum();
        let set = merge("q", lists, true);
        assert!(set.len() <= total);
        // At least as many as the most-contributing engine's unique URLs.
        assert!(set.len() >= 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn merge_empty_input() {
        let set = merge("q", Vec::new(), true);
        assert!(set.is_empty());
        assert!(set.engines.is_empty());
        assert_eq!(set.query, "q");
    }
}
