//! Quarry CLI - multi-engine search from the command line.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use quarry::engine::EngineStatus;
use quarry::export::{self, ExportFormat};
use quarry::transport::TransportConfig;
use quarry::{
    EngineRegistry, FilterKind, Orchestrator, ResultFilter, ResultKind, SafeSearch, SearchQuery,
};

/// Quarry - multi-engine web search scraper
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search across the configured engines
    Search(SearchArgs),

    /// List available search engines
    Engines,

    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Engines to query (comma-separated)
    /// Available: bing, yahoo, aol, duckduckgo, startpage, ask, torch
    #[arg(short, long, value_delimiter = ',', default_value = "bing")]
    engines: Vec<String>,

    /// Result pages to fetch per engine
    #[arg(short, long, default_value = "1")]
    pages: u32,

    /// Output formats (comma-separated): text, json, csv, html, links
    #[arg(short, long, value_delimiter = ',', default_value = "text")]
    format: Vec<CliFormat>,

    /// Directory for report files (formats other than text/links print
    /// to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Filter results by field (substring match)
    #[arg(long, value_enum)]
    filter: Option<CliFilter>,

    /// Filter pattern (defaults to the query text)
    #[arg(long)]
    filter_text: Option<String>,

    /// Remove cross-engine URL duplicates
    #[arg(long)]
    dedup: bool,

    /// Proxy URL (e.g. http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(long)]
    proxy: Option<String>,

    /// Route through TOR (socks5://127.0.0.1:9050 unless --proxy is set)
    #[arg(long)]
    tor: bool,

    /// Skip TLS certificate verification for the proxy route
    #[arg(long)]
    insecure: bool,

    /// Language code (en, de, fr, ...)
    #[arg(short, long)]
    language: Option<String>,

    /// Country code (us, gb, de, ...)
    #[arg(short, long)]
    country: Option<String>,

    /// Safe search level
    #[arg(long, value_enum, default_value = "moderate")]
    safe_search: CliSafeSearch,

    /// Result vertical (all, news, images, videos); engines without the
    /// vertical fall back to web results
    #[arg(long, default_value = "all")]
    result_type: String,

    /// Per-engine timeout in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(long, default_value = "5003")]
    port: u16,

    /// Directory for export files
    #[arg(long, default_value = "exports")]
    exports_dir: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliFormat {
    /// Human-readable text output
    Text,
    /// JSON records
    Json,
    /// RFC-4180 CSV
    Csv,
    /// Semantic HTML list
    Html,
    /// Newline-delimited URLs
    Links,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliFilter {
    Url,
    Title,
    Text,
    Host,
}

impl From<CliFilter> for FilterKind {
    fn from(value: CliFilter) -> Self {
        match value {
            CliFilter::Url => FilterKind::Url,
            CliFilter::Title => FilterKind::Title,
            CliFilter::Text => FilterKind::Text,
            CliFilter::Host => FilterKind::Host,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CliSafeSearch {
    Off,
    Moderate,
    Strict,
}

impl From<CliSafeSearch> for SafeSearch {
    fn from(value: CliSafeSearch) -> Self {
        match value {
            CliSafeSearch::Off => SafeSearch::Off,
            CliSafeSearch::Moderate => SafeSearch::Moderate,
            CliSafeSearch::Strict => SafeSearch::Strict,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("quarry=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quarry=warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Engines => list_engines(),
        Commands::Serve(args) => run_serve(args).await,
    }
}

fn list_engines() -> Result<()> {
    let registry = EngineRegistry::builtin();
    println!("Available search engines:\n");
    for descriptor in registry.descriptors() {
        let mut notes = Vec::new();
        if descriptor.supports_paging() {
            notes.push("paging");
        }
        if descriptor.supports_language {
            notes.push("language");
        }
        if descriptor.supports_safe_search {
            notes.push("safe-search");
        }
        if descriptor.tor_only {
            notes.push("TOR only");
        }
        println!(
            "  {:<12} {} [{}]",
            descriptor.id,
            descriptor.name,
            notes.join(", ")
        );
    }
    println!("\nUsage: quarry search \"query\" -e bing,yahoo,duckduckgo");
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    // Unparseable proxy strings and other configuration problems are
    // the only non-zero exits; per-engine failures are reported below.
    let transport = build_transport(&args)?;

    let mut query = SearchQuery::new(&args.query)
        .with_engines(args.engines.clone())
        .with_pages(args.pages)
        .with_safe_search(args.safe_search.into())
        .with_result_type(ResultKind::parse_lenient(&args.result_type))
        .with_dedup(args.dedup)
        .with_transport(transport);

    if let Some(language) = &args.language {
        query = query.with_language(language);
    }
    if let Some(country) = &args.country {
        query = query.with_country(country);
    }
    if let Some(kind) = args.filter {
        query = query.with_filter(ResultFilter::new(
            FilterKind::from(kind),
            args.filter_text.clone().unwrap_or_default(),
        ));
    }

    let registry = Arc::new(EngineRegistry::builtin());
    let orchestrator =
        Orchestrator::new(registry).with_engine_timeout(Duration::from_secs(args.timeout));

    let report = orchestrator
        .run(query)
        .await
        .context("search configuration rejected")?;

    for (engine, status) in &report.statuses {
        match status {
            EngineStatus::Ok => {}
            EngineStatus::Blocked => eprintln!("warning: {} blocked the request", engine),
            EngineStatus::Error(reason) => eprintln!("warning: {} failed: {}", engine, reason),
            EngineStatus::UnknownEngine => eprintln!("warning: unknown engine '{}'", engine),
        }
    }

    for format in &args.format {
        match format {
            CliFormat::Text => print_text(&report.results),
            CliFormat::Links => print!("{}", export::to_links(report.results.items())),
            CliFormat::Json | CliFormat::Csv | CliFormat::Html => {
                let export_format = match format {
                    CliFormat::Json => ExportFormat::Json,
                    CliFormat::Csv => ExportFormat::Csv,
                    _ => ExportFormat::Html,
                };
                match &args.output {
                    Some(dir) => {
                        let path = export::write_report(&report.results, export_format, dir)?;
                        eprintln!("wrote {}", path.display());
                    }
                    None => print!("{}", export::render(&report.results, export_format)?),
                }
            }
        }
    }

    Ok(())
}

fn print_text(results: &quarry::SearchResultSet) {
    println!(
        "\nSearch results for \"{}\" ({} results from {} engines):\n",
        results.query,
        results.len(),
        results.engines.len()
    );
    for (i, result) in results.items().iter().enumerate() {
        println!("{}. {}", i + 1, result.title);
        println!("   URL: {}", result.url);
        if !result.snippet.is_empty() {
            let snippet: String = result.snippet.chars().take(150).collect();
            if snippet.len() < result.snippet.len() {
                println!("   {}...", snippet);
            } else {
                println!("   {}", snippet);
            }
        }
        println!("   Engine: {}", result.engine);
        println!();
    }
}

fn build_transport(args: &SearchArgs) -> Result<TransportConfig> {
    let mut config = if args.tor && args.proxy.is_none() {
        TransportConfig::tor()
    } else if let Some(proxy) = &args.proxy {
        let mut config = TransportConfig::with_proxy_str(proxy)?;
        config.use_tor = args.tor;
        config
    } else {
        TransportConfig::direct()
    };
    if args.insecure {
        config = config.with_insecure_tls();
    }
    Ok(config)
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;

    let registry = Arc::new(EngineRegistry::builtin());
    quarry::server::serve(addr, registry, args.exports_dir).await?;
    Ok(())
}
