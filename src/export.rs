//! Result export pipeline.
//!
//! Serializes a [`SearchResultSet`] to JSON, CSV, HTML or a plain link
//! list, and re-imports the JSON/CSV representations. JSON and CSV are
//! round-trip safe: exporting then importing reconstructs the same
//! `EngineResult` records field for field. Export files are the only
//! state this crate ever writes to disk.

use std::path::{Path, PathBuf};

use crate::{EngineResult, Result, SearchError, SearchResultSet};

/// CSV header row shared by the writer and the importer.
const CSV_HEADER: [&str; 4] = ["title", "url", "snippet", "engine"];

/// Supported export representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
    /// Newline-delimited URLs only.
    Links,
}

impl ExportFormat {
    /// Parses a format name.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "html" => Ok(ExportFormat::Html),
            "links" | "print" | "txt" => Ok(ExportFormat::Links),
            other => Err(SearchError::Config(format!(
                "unknown export format: {}",
                other
            ))),
        }
    }

    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Links => "txt",
        }
    }
}

/// Serializes results as a JSON array of records.
pub fn to_json(results: &[EngineResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(|e| SearchError::Parse(e.to_string()))
}

/// Re-imports results from a JSON export.
pub fn from_json(raw: &str) -> Result<Vec<EngineResult>> {
    serde_json::from_str(raw).map_err(|e| SearchError::Parse(e.to_string()))
}

/// Serializes results as RFC-4180 CSV with a header row.
pub fn to_csv(results: &[EngineResult]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push_str("\r\n");
    for result in results {
        let fields = [
            result.title.as_str(),
            result.url.as_str(),
            result.snippet.as_str(),
            result.engine.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_quote(f)).collect();
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Re-imports results from a CSV export.
pub fn from_csv(raw: &str) -> Result<Vec<EngineResult>> {
    let mut rows = parse_csv(raw).into_iter();

    let header = rows
        .next()
        .ok_or_else(|| SearchError::Parse("CSV export is empty".into()))?;
    if header != CSV_HEADER {
        return Err(SearchError::Parse(format!(
            "unexpected CSV header: {:?}",
            header
        )));
    }

    let mut results = Vec::new();
    for (index, row) in rows.enumerate() {
        if row.len() != CSV_HEADER.len() {
            return Err(SearchError::Parse(format!(
                "CSV row {} has {} fields, expected {}",
                index + 2,
                row.len(),
                CSV_HEADER.len()
            )));
        }
        let mut row = row.into_iter();
        results.push(EngineResult {
            title: row.next().unwrap_or_default(),
            url: row.next().unwrap_or_default(),
            snippet: row.next().unwrap_or_default(),
            engine: row.next().unwrap_or_default(),
        });
    }
    Ok(results)
}

/// Quotes one CSV field per RFC 4180 (quotes only when needed).
fn csv_quote(field: &str) -> String {
    if field.contains(['"', ',', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Minimal RFC-4180 reader: quoted fields, doubled quotes, CRLF or LF.
fn parse_csv(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Renders the result set as one semantic HTML list.
pub fn to_html(set: &SearchResultSet) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Search results for {}</title>\n</head>\n<body>\n",
        html_escape(&set.query)
    ));
    out.push_str(&format!("<h1>{}</h1>\n<ol>\n", html_escape(&set.query)));
    for result in set.items() {
        out.push_str("<li>\n");
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            html_escape(&result.url),
            html_escape(&result.title)
        ));
        if !result.snippet.is_empty() {
            out.push_str(&format!("<p>{}</p>\n", html_escape(&result.snippet)));
        }
        out.push_str(&format!("<small>{}</small>\n", html_escape(&result.engine)));
        out.push_str("</li>\n");
    }
    out.push_str("</ol>\n</body>\n</html>\n");
    out
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Renders a newline-delimited list of result URLs.
pub fn to_links(results: &[EngineResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&result.url);
        out.push('\n');
    }
    out
}

/// Renders the set in the requested format.
pub fn render(set: &SearchResultSet, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(set.items()),
        ExportFormat::Csv => Ok(to_csv(set.items())),
        ExportFormat::Html => Ok(to_html(set)),
        ExportFormat::Links => Ok(to_links(set.items())),
    }
}

/// Writes one export file into `dir`, returning its path.
///
/// The file stem derives from the query text the way the original
/// report writer named files (words joined by underscores).
pub fn write_report(set: &SearchResultSet, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let stem: String = if set.query.trim().is_empty() {
        "search_results".to_string()
    } else {
        set.query.split_whitespace().collect::<Vec<_>>().join("_")
    };
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    std::fs::write(&path, render(set, format)?)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<EngineResult> {
        vec![
            EngineResult::new(
                "Rust Programming Language",
                "https://www.rust-lang.org/",
                "A language empowering everyone",
                "bing",
            ),
            EngineResult::new(
                "Title, with \"quotes\"",
                "https://example.com/path?a=1",
                "line one\nline two",
                "yahoo",
            ),
            EngineResult::new("", "https://no-title.example.com/", "", "ask"),
        ]
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("json").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("html").unwrap(), ExportFormat::Html);
        assert_eq!(ExportFormat::parse("print").unwrap(), ExportFormat::Links);
        assert!(ExportFormat::parse("xml").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let results = sample();
        let json = to_json(&results).unwrap();
        let back = from_json(&json).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_json_accepts_legacy_field_names() {
        let raw = r#"[{"title":"T","link":"https://a.com","description":"d","engine":"bing"}]"#;
        let results = from_json(raw).unwrap();
        assert_eq!(results[0].url, "https://a.com");
        assert_eq!(results[0].snippet, "d");
    }

    #[test]
    fn test_csv_round_trip() {
        let results = sample();
        let csv = to_csv(&results);
        let back = from_csv(&csv).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_csv_header_row() {
        let csv = to_csv(&sample());
        assert!(csv.starts_with("title,url,snippet,engine\r\n"));
    }

    #[test]
    fn test_csv_quoting() {
        let results = vec![EngineResult::new("a,b", "https://x.com", "say \"hi\"", "bing")];
        let csv = to_csv(&results);
        assert!(csv.contains("\"a,b\""));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn test_csv_embedded_newline_round_trip() {
        let results = vec![EngineResult::new("t", "https://x.com", "one\r\ntwo", "bing")];
        let back = from_csv(&to_csv(&results)).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn test_from_csv_rejects_wrong_header() {
        assert!(from_csv("a,b,c,d\r\n").is_err());
        assert!(from_csv("").is_err());
    }

    #[test]
    fn test_from_csv_rejects_short_row() {
        let raw = "title,url,snippet,engine\r\nonly,three,fields\r\n";
        assert!(from_csv(raw).is_err());
    }

    #[test]
    fn test_from_csv_accepts_lf_only() {
        let raw = "title,url,snippet,engine\nT,https://a.com,s,bing\n";
        let results = from_csv(raw).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].engine, "bing");
    }

    #[test]
    fn test_html_escapes_content() {
        let mut set = SearchResultSet::new("<script>", vec!["bing".into()]);
        set.push(EngineResult::new(
            "a < b & c",
            "https://example.com/?q=\"x\"",
            "",
            "bing",
        ));
        let html = to_html(&set);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a &lt; b &amp; c"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_html_is_a_list() {
        let mut set = SearchResultSet::new("q", vec!["bing".into()]);
        set.push(EngineResult::new("t", "https://a.com", "s", "bing"));
        let html = to_html(&set);
        assert!(html.contains("<ol>"));
        assert_eq!(html.matches("<li>").count(), 1);
    }

    #[test]
    fn test_links_output() {
        let results = sample();
        let links = to_links(&results);
        let lines: Vec<_> = links.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "https://www.rust-lang.org/");
    }

    #[test]
    fn test_write_report_names_file_after_query() {
        let dir = std::env::temp_dir().join("quarry-export-test");
        let mut set = SearchResultSet::new("rust async book", vec!["bing".into()]);
        set.push(EngineResult::new("t", "https://a.com", "s", "bing"));
        let path = write_report(&set, ExportFormat::Json, &dir).unwrap();
        assert!(path.ends_with("rust_async_book.json"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_json(&raw).unwrap(), set.items());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_render_dispatch() {
        let mut set = SearchResultSet::new("q", vec!["bing".into()]);
        set.push(EngineResult::new("t", "https://a.com", "s", "bing"));
        assert!(render(&set, ExportFormat::Json).unwrap().contains("\"url\""));
        assert!(render(&set, ExportFormat::Csv)
            .unwrap()
            .starts_with("title,url"));
        assert!(render(&set, ExportFormat::Html).unwrap().contains("<ol>"));
        assert_eq!(
            render(&set, ExportFormat::Links).unwrap(),
            "https://a.com\n"
        );
    }
}
