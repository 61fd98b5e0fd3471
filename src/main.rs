//! Listing-Harvester main entry point
//!
//! This is the command-line interface for the Listing-Harvester directory crawler.

use anyhow::Context;
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, validate, Config};
use listing_harvester::crawler::run_crawl;
use listing_harvester::output::{print_statistics, ExportStats};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code of a run stopped by Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

/// Listing-Harvester: a resilient business-directory crawler
///
/// Walks the listing pages of a business directory, extracts every opened
/// company's contact data and resolves an email address through the
/// directory, the company website and its imprint page. Results are written
/// to one CSV file per run.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resilient business-directory crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Search term, e.g. a trade
    #[arg(long)]
    search_term: Option<String>,

    /// Search location, e.g. a city
    #[arg(long)]
    location: Option<String>,

    /// Maximum number of listing pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// Directory for the CSV file and debug captures
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Run the browser headless (true/false)
    #[arg(long, value_name = "BOOL")]
    headless: Option<bool>,

    /// Test mode: at most 2 pages and a small record limit
    #[arg(long)]
    test: bool,

    /// Skip the email extraction pass
    #[arg(long)]
    no_emails: bool,

    /// Fixed delay between navigations, in seconds
    #[arg(long, value_name = "SECONDS")]
    delay: Option<f64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the effective configuration and start URL without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_INTERRUPTED),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected mode; returns true if the crawl was interrupted
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = load(&cli)?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(false);
    }

    handle_crawl(config).await
}

/// Loads the configuration file, or the defaults without one
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let Some(path) = &cli.config else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Applies command-line flags on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(term) = &cli.search_term {
        config.target.search_term = term.clone();
    }
    if let Some(location) = &cli.location {
        config.target.location = location.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.scraping.max_pages = max_pages;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(headless) = cli.headless {
        config.browser.headless = headless;
    }
    if cli.test {
        config.scraping.test_mode = true;
        config.scraping.max_pages = config.scraping.max_pages.min(2);
    }
    if cli.no_emails {
        config.email.enabled = false;
    }
    if let Some(seconds) = cli.delay {
        let ms = (seconds.max(0.0) * 1000.0).round() as u64;
        config.scraping.delay_min_ms = ms;
        config.scraping.delay_max_ms = ms;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let start = config.start_url()?;

    println!("=== Listing-Harvester Dry Run ===\n");

    println!("Target:");
    println!("  Directory: {}", config.target.base_url);
    println!("  Search term: {}", config.target.search_term);
    println!("  Location: {}", config.target.location);
    println!("  Start URL: {}", start);

    println!("\nScraping:");
    println!("  Max pages: {}", config.scraping.max_pages);
    println!("  Entries per page: {}", config.scraping.entries_per_page);
    println!(
        "  Delay between navigations: {}-{}ms",
        config.scraping.delay_min_ms, config.scraping.delay_max_ms
    );
    println!(
        "  Retries: {} attempts, {}ms base delay",
        config.scraping.retry.max_attempts, config.scraping.retry.base_delay_ms
    );
    if config.scraping.test_mode {
        println!(
            "  Test mode: stop after {} records",
            config.scraping.test_record_limit
        );
    }

    println!("\nBrowser:");
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Navigation timeout: {}ms",
        config.browser.navigation_timeout_ms
    );

    println!("\nEmail:");
    if config.email.enabled {
        println!("  Detail page: {}", config.email.from_detail_page);
        println!("  Website: {}", config.email.from_website);
        println!("  Imprint: {}", config.email.from_imprint);
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File name: {}", config.output.filename);
    println!("  Source label: {}", config.source_label());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation; returns true if it was interrupted
async fn handle_crawl(config: Config) -> anyhow::Result<bool> {
    tracing::info!(
        "Searching '{}' in '{}' on {}",
        config.target.search_term,
        config.target.location,
        config.target.base_url
    );

    let outcome = run_crawl(config).await.context("Crawl failed")?;

    if let Some(path) = &outcome.output {
        tracing::info!("Results exported to: {}", path.display());
    }
    print_statistics(
        &outcome.stats,
        &ExportStats::from_records(&outcome.records),
        outcome.elapsed,
    );

    Ok(outcome.interrupted)
}
