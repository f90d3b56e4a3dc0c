use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

use scout_client::ReqwestFetcher;
use scout_client::fetcher::DEFAULT_USER_AGENT;
use scout_core::discovery::parse_page_url;
use scout_core::links::article_urls;
use scout_core::{
    ArticleSelectors, DiscoveryEngine, DiscoveryResult, Document, Fetcher, SelectorValidator,
    TracingValidationReporter, ValidationConfig, ValidationResult, merge,
};

#[derive(Parser)]
#[command(name = "scout", version, about = "Discover and validate news-site selectors")]
struct Cli {
    /// User-Agent sent with every request
    #[arg(long, global = true, env = "SCOUT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-page fetch timeout in seconds
    #[arg(long, global = true, env = "SCOUT_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer selectors from a listing page and one of its articles
    Discover {
        /// Listing (index) page URL
        #[arg(short, long)]
        url: String,

        /// Article page URL (defaults to the first article linked from the listing)
        #[arg(short, long)]
        article_url: Option<String>,

        /// Read the listing page HTML from a file instead of fetching it
        #[arg(long)]
        html_file: Option<PathBuf>,

        /// Only analyse the listing page
        #[arg(long, default_value_t = false)]
        listing_only: bool,

        /// Write the JSON result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a selector set against real article pages
    Validate {
        /// JSON file mapping field names to selector fallback chains
        #[arg(short, long)]
        selectors: PathBuf,

        /// Article URLs to check (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// Listing page to harvest article URLs from
        #[arg(long)]
        from_listing: Option<String>,

        /// Maximum number of articles to check (0 uses the default of 10)
        #[arg(short, long, default_value_t = 0)]
        max_samples: usize,

        /// Pages fetched concurrently
        #[arg(short, long, env = "SCOUT_CONCURRENCY", default_value_t = 4)]
        concurrency: usize,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout_secs);
    let fetcher = ReqwestFetcher::with_options(timeout, &cli.user_agent)
        .context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Discover {
            url,
            article_url,
            html_file,
            listing_only,
            output,
        } => {
            let result = cmd_discover(
                &fetcher,
                &url,
                article_url.as_deref(),
                html_file.as_deref(),
                listing_only,
            )
            .await?;
            let json = serde_json::to_string_pretty(&result)?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Commands::Validate {
            selectors,
            urls,
            from_listing,
            max_samples,
            concurrency,
            format,
        } => {
            let selectors = load_selectors(&selectors)?;
            let config = ValidationConfig::default()
                .with_concurrency(concurrency)
                .with_fetch_timeout(timeout);
            let result = cmd_validate(
                fetcher,
                config,
                &selectors,
                urls,
                from_listing.as_deref(),
                max_samples,
            )
            .await?;
            let mut stdout = std::io::stdout().lock();
            match format {
                ReportFormat::Text => render_text(&result, &mut stdout)?,
                ReportFormat::Json => {
                    writeln!(stdout, "{}", serde_json::to_string_pretty(&result)?)?
                }
                ReportFormat::Csv => render_csv(&result, &mut stdout)?,
            }
        }
    }

    Ok(())
}

async fn fetch_document(fetcher: &ReqwestFetcher, url: &str) -> Result<String> {
    tracing::info!("Fetching {}", url);
    let html = fetcher.fetch(url).await?;
    tracing::info!("Fetched {} bytes of HTML", html.len());
    Ok(html)
}

async fn cmd_discover(
    fetcher: &ReqwestFetcher,
    url: &str,
    article_url: Option<&str>,
    html_file: Option<&Path>,
    listing_only: bool,
) -> Result<DiscoveryResult> {
    let base = parse_page_url(url)?;
    let engine = DiscoveryEngine::new();

    let listing_html = match html_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read HTML file: {}", path.display()))?,
        None => fetch_document(fetcher, url).await?,
    };

    // Documents are parsed and dropped before the next await.
    let (main, first_article) = {
        let doc = Document::parse(&listing_html);
        let main = engine.discover(&doc, url)?;
        (main, article_urls(&doc, &base, 1).into_iter().next())
    };

    if listing_only {
        return Ok(main);
    }

    let Some(article_url) = article_url.map(str::to_string).or(first_article) else {
        tracing::warn!("No article link found on the listing page; using listing results only");
        return Ok(main);
    };

    let article_html = fetch_document(fetcher, &article_url).await?;
    let article = engine.discover_html(&article_html, &article_url)?;

    let merged = merge(&main, &article);
    let review = merged.fields_needing_review();
    if !review.is_empty() {
        tracing::warn!(fields = ?review, "Some selectors need manual review");
    }
    Ok(merged)
}

async fn cmd_validate(
    fetcher: ReqwestFetcher,
    config: ValidationConfig,
    selectors: &ArticleSelectors,
    mut urls: Vec<String>,
    from_listing: Option<&str>,
    max_samples: usize,
) -> Result<ValidationResult> {
    if let Some(listing) = from_listing {
        let base = Url::parse(listing).context("Invalid listing URL")?;
        let html = fetch_document(&fetcher, listing).await?;
        let harvested = article_urls(&Document::parse(&html), &base, usize::MAX);
        tracing::info!("Harvested {} article URLs from {}", harvested.len(), listing);
        urls.extend(harvested);
    }
    if urls.is_empty() {
        bail!("No URLs to validate: pass --url or --from-listing");
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with partial results");
            ctrl_c.cancel();
        }
    });

    let validator = SelectorValidator::with_config(fetcher, config);
    let result = validator
        .validate(
            selectors,
            &urls,
            max_samples,
            &cancel,
            &TracingValidationReporter,
        )
        .await?;
    Ok(result)
}

fn load_selectors(path: &Path) -> Result<ArticleSelectors> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read selectors file: {}", path.display()))?;
    ArticleSelectors::from_json(&json)
        .with_context(|| format!("Invalid selectors in {}", path.display()))
}

fn render_text(result: &ValidationResult, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "Validated {} articles: {} with title and body ({:.2}%){}",
        result.total_articles,
        result.successful_articles,
        result.overall_success_rate(),
        if result.cancelled { " [cancelled]" } else { "" }
    )?;

    for r in result.field_results.values() {
        writeln!(
            out,
            "  {:<16} {:>3}/{:<3} {:>6.2}%",
            r.field_name.as_str(),
            r.success_count,
            r.total_count,
            r.success_rate
        )?;
        for sample in &r.sample_values {
            writeln!(out, "      sample: {sample}")?;
        }
        for url in &r.failed_urls {
            writeln!(out, "      failed: {url}")?;
        }
    }
    Ok(())
}

fn render_csv(result: &ValidationResult, out: &mut impl Write) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "field",
        "success_count",
        "total_count",
        "success_rate",
        "failed_urls",
    ])?;
    for r in result.field_results.values() {
        writer.write_record([
            r.field_name.as_str().to_string(),
            r.success_count.to_string(),
            r.total_count.to_string(),
            format!("{:.2}", r.success_rate),
            r.failed_urls.join(" "),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
