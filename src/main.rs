//! Wirecrawl main entry point
//!
//! This is the command-line interface for the Wirecrawl archive crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wirecrawl::config::{load_config_with_hash, Config};
use wirecrawl::crawler::crawl_category;
use wirecrawl::output::print_summary;
use wirecrawl::state::{BarProgress, LogProgress, ProgressReporter};
use wirecrawl::{ArticleLayout, Category};

/// Wirecrawl: a news-wire archive crawler
///
/// Wirecrawl walks the paginated archive of one site section, stores the
/// article links it finds, then fetches every article concurrently and
/// writes the parsed records to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "wirecrawl")]
#[command(version = "1.0.0")]
#[command(about = "A news-wire archive crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Archive section to crawl (e.g. worldnews, businessnews)
    #[arg(short, long)]
    category: Category,

    /// Walk the listing pages again instead of reusing the stored URL file
    #[arg(long)]
    rediscover: bool,

    /// Article template to parse with, overriding the config file
    #[arg(long, value_name = "plain|categorized")]
    layout: Option<ArticleLayout>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(layout) = cli.layout {
        config.crawler.layout = layout;
    }

    if cli.dry_run {
        handle_dry_run(&config, cli.category, cli.rediscover);
        return Ok(());
    }

    handle_crawl(config, cli.category, cli.rediscover, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wirecrawl=info,warn"),
            1 => EnvFilter::new("wirecrawl=debug,info"),
            2 => EnvFilter::new("wirecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration for one run
fn handle_dry_run(config: &Config, category: Category, rediscover: bool) {
    println!("=== Wirecrawl Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Page size: {}", config.site.page_size);
    match config.site.max_pages {
        Some(max) => println!("  Max listing pages: {}", max),
        None => println!("  Max listing pages: unlimited"),
    }

    println!("\nCrawler:");
    println!("  Concurrency limit: {}", config.crawler.concurrency_limit);
    println!(
        "  Request timeout: {}s (connect {}s)",
        config.crawler.request_timeout_secs, config.crawler.connect_timeout_secs
    );
    match config.crawler.crawl_deadline_secs {
        Some(secs) => println!("  Crawl deadline: {}s", secs),
        None => println!("  Crawl deadline: none"),
    }
    println!("  Layout: {}", config.crawler.layout);
    println!("  Pipeline: {:?}", config.crawler.pipeline);

    println!("\nUser Agents ({}):", config.user_agent.pool.len());
    for agent in &config.user_agent.pool {
        println!("  - {}", agent);
    }

    println!("\nOutput:");
    println!(
        "  URL file: {}",
        config.output.url_file(category.as_str()).display()
    );
    println!(
        "  Record file: {}",
        config.output.record_file(category.as_str()).display()
    );

    println!("\n✓ Configuration is valid");
    if rediscover {
        println!("✓ Would rediscover article URLs for '{}'", category);
    } else {
        println!("✓ Would reuse stored article URLs for '{}'", category);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    category: Category,
    rediscover: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let record_path = config.output.record_file(category.as_str());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work");
            interrupt.cancel();
        }
    });

    let progress: Box<dyn ProgressReporter> = if quiet {
        Box::new(LogProgress::default())
    } else {
        Box::new(BarProgress::stderr())
    };

    let report = crawl_category(config, category, rediscover, cancel, progress.as_ref())
        .await
        .with_context(|| format!("Crawl of '{}' failed", category))?;

    if !quiet {
        print_summary(&report);
        println!("Records written to: {}", record_path.display());
    }

    Ok(())
}
