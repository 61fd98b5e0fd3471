//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the loop that walks the directory:
//! - Entering the first listing page
//! - Opening entries and extracting their detail pages
//! - Flushing records to the sink as they are found
//! - Following pagination until it runs out or a limit is hit
//! - Resolving emails once the crawl is over
//! - Writing the final, deduplicated output

use crate::browser::{BrowserDriver, HttpDriver};
use crate::config::Config;
use crate::crawler::navigator::{Navigator, OpenOutcome};
use crate::crawler::pagination::{advance, Advance};
use crate::crawler::resolver::EmailResolver;
use crate::extract::CompanyExtractor;
use crate::output::{dedup, CompanyRecord, CsvSink, RecordSink};
use crate::state::{CrawlSession, RunStats};
use crate::url::DirectoryOrigin;
use crate::{ConfigError, HarvestError, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Shared flag that asks a running crawl to stop
///
/// The crawl checks it before every navigation; what was collected so far is
/// still written.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Triggers the flag on Ctrl-C
    pub fn listen_for_ctrl_c(&self) {
        let flag = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping after the current step");
                flag.trigger();
            }
        });
    }
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final deduplicated records, in traversal order
    pub records: Vec<CompanyRecord>,
    pub stats: RunStats,
    /// File the records were written to
    pub output: Option<PathBuf>,
    /// The run was stopped by an interrupt
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator<D: BrowserDriver, S: RecordSink> {
    config: Arc<Config>,
    navigator: Navigator<D>,
    sink: S,
    session: CrawlSession,
    extractor: CompanyExtractor,
    resolver: EmailResolver,
    interrupt: Interrupt,
    records: Vec<CompanyRecord>,
    output: Option<PathBuf>,
}

impl Coordinator<HttpDriver, CsvSink> {
    /// Creates a coordinator with the HTTP driver and a CSV sink
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The driver could not be built or the base URL is invalid
    pub fn new(config: Config) -> Result<Self> {
        let driver = HttpDriver::new(&config.browser)?;
        let sink = CsvSink::from_config(&config.output, config.source_label());
        Self::with_parts(config, driver, sink)
    }
}

impl<D: BrowserDriver, S: RecordSink> Coordinator<D, S> {
    /// Creates a coordinator from an existing driver and sink
    pub fn with_parts(config: Config, driver: D, sink: S) -> Result<Self> {
        let base = config.base_url()?;
        let origin = DirectoryOrigin::from_url(&base).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("base-url '{}' has no host", base))
        })?;

        let navigator = Navigator::new(driver, &config);
        let resolver = EmailResolver::new(&config.email, origin, navigator.navigation_timeout());

        Ok(Self {
            config: Arc::new(config),
            navigator,
            sink,
            session: CrawlSession::new(),
            extractor: CompanyExtractor::new(),
            resolver,
            interrupt: Interrupt::new(),
            records: Vec::new(),
            output: None,
        })
    }

    /// Uses `interrupt` instead of the coordinator's own flag
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.resolver.set_interrupt(interrupt.clone());
        self.interrupt = interrupt;
        self
    }

    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator<D> {
        &self.navigator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the crawl, the email pass and the final write
    ///
    /// A navigation failure ends the traversal but not the run; what was
    /// collected is still resolved and written, and the driver is always
    /// closed.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let start = match self.config.start_url() {
            Ok(url) => url,
            Err(e) => {
                self.navigator.close().await;
                return Err(e.into());
            }
        };
        tracing::info!(
            "Starting crawl of {} (at most {} pages)",
            start,
            self.config.scraping.max_pages
        );

        match self.crawl(&start).await {
            Ok(()) => {}
            Err(HarvestError::Interrupted) => tracing::warn!("Crawl interrupted"),
            Err(e) => {
                tracing::error!("Crawl stopped: {}", e);
                self.session.stats.errors += 1;
            }
        }

        if !self.interrupted() {
            self.resolve_emails().await;
        }

        let written = self.finalize();
        self.navigator.close().await;
        let output = written?;

        let outcome = RunOutcome {
            records: self.records.clone(),
            stats: self.session.stats,
            output: Some(output),
            interrupted: self.interrupted(),
            elapsed: self.session.elapsed(),
        };
        tracing::info!(
            "Crawl completed: {} records in {:?}",
            outcome.records.len(),
            outcome.elapsed
        );
        Ok(outcome)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.is_triggered()
    }

    fn test_limit_reached(&self) -> bool {
        let scraping = &self.config.scraping;
        scraping.test_mode && self.records.len() >= scraping.test_record_limit as usize
    }

    /// Walks listing pages until pagination or a limit ends the traversal
    async fn crawl(&mut self, start: &Url) -> Result<()> {
        if self.interrupted() {
            return Err(HarvestError::Interrupted);
        }
        self.navigator.enter_listing(&mut self.session, start).await?;

        loop {
            self.process_listing_page().await?;

            if self.test_limit_reached() {
                tracing::info!(
                    "Test mode: stopping after {} companies",
                    self.records.len()
                );
                return Ok(());
            }
            if self.interrupted() {
                return Err(HarvestError::Interrupted);
            }

            let max_pages = self.config.scraping.max_pages;
            match advance(&mut self.navigator, &mut self.session, max_pages).await? {
                Advance::Moved(url) => tracing::debug!("Advanced to {}", url),
                Advance::NoMorePages => return Ok(()),
            }
        }
    }

    /// Opens the configured number of entries of the current listing, in DOM order
    async fn process_listing_page(&mut self) -> Result<()> {
        let page = self.session.page_count();
        tracing::info!("Processing page {}", page);

        for index in 0..self.config.scraping.entries_per_page as usize {
            if self.interrupted() || self.test_limit_reached() {
                return Ok(());
            }

            match self.navigator.open_result(&mut self.session, index).await {
                Ok(OpenOutcome::Opened(url)) => {
                    self.navigator.stabilize_detail().await;
                    self.extract_detail(&url);
                }
                Ok(OpenOutcome::AlreadyVisited(_)) => continue,
                Ok(OpenOutcome::Missing) => break,
                Err(e) => {
                    tracing::warn!("Could not open entry {} on page {}: {}", index + 1, page, e);
                    self.session.stats.errors += 1;
                    let shown = self.navigator.driver().current_url();
                    if shown.as_ref() == self.session.last_listing_url() {
                        continue;
                    }
                }
            }

            if self.interrupted() {
                return Ok(());
            }
            self.navigator.return_to_listing(&mut self.session).await?;
        }

        Ok(())
    }

    /// Extracts the open detail page and flushes the record
    fn extract_detail(&mut self, url: &Url) {
        let record = {
            let snapshot = match self.navigator.snapshot() {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    // Same as a page without company markup
                    tracing::info!("No company data on {}: {}", url, e);
                    return;
                }
            };

            if self.config.email.enabled && self.config.email.from_detail_page {
                self.resolver.record_page(url, &snapshot, false);
            }
            self.extractor.extract(&snapshot)
        };

        let Some(record) = record else {
            tracing::info!("No company data on {}", url);
            return;
        };

        self.session.stats.companies_found += 1;
        tracing::info!(
            "Found company {}: {}",
            self.session.stats.companies_found,
            record.label()
        );
        self.flush(std::slice::from_ref(&record));
        self.records.push(record);
    }

    /// Appends records to the run's output; failures are logged and counted
    fn flush(&mut self, records: &[CompanyRecord]) {
        let result = if let Some(location) = self.output.clone() {
            self.sink.flush_append(records, &location)
        } else {
            match self.sink.append(records) {
                Ok(location) => {
                    tracing::info!("Writing results to {}", location.display());
                    self.output = Some(location);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        };
        if let Err(e) = result {
            tracing::warn!("Failed to flush {} record(s): {}", records.len(), e);
            self.session.stats.errors += 1;
        }
    }

    /// Resolves an email for every collected record, in collection order
    async fn resolve_emails(&mut self) {
        if !self.config.email.enabled {
            tracing::info!("Email extraction disabled");
            return;
        }
        if self.records.is_empty() {
            return;
        }

        tracing::info!("Starting email extraction for {} companies", self.records.len());

        for index in 0..self.records.len() {
            if self.interrupted() {
                tracing::warn!("Email extraction interrupted");
                return;
            }

            let record = self.records[index].clone();
            match self
                .resolver
                .resolve(&mut self.navigator, &mut self.session, &record)
                .await
            {
                Ok(Some((email, source))) => {
                    tracing::info!("{}: {} (from {})", record.label(), email, source);
                    self.records[index].email = Some(email);
                    self.session.stats.emails_extracted += 1;
                }
                Ok(None) => tracing::debug!("{}: no email found", record.label()),
                Err(HarvestError::Interrupted) => {
                    tracing::warn!("Email extraction interrupted");
                    return;
                }
                Err(e) => {
                    tracing::warn!("Email resolution failed for {}: {}", record.label(), e);
                    self.session.stats.errors += 1;
                }
            }
        }

        let found = self.session.stats.emails_extracted;
        let total = self.records.len();
        tracing::info!(
            "Email extraction completed: {}/{} emails found ({:.1}%)",
            found,
            total,
            found as f64 / total as f64 * 100.0
        );
    }

    /// Deduplicates and rewrites the run's output
    fn finalize(&mut self) -> Result<PathBuf> {
        self.records = dedup(std::mem::take(&mut self.records));

        let location = match self.output.clone() {
            Some(location) => location,
            None => {
                let location = self.sink.append(&[])?;
                self.output = Some(location.clone());
                location
            }
        };
        self.sink.finalize(&self.records, &location)?;
        Ok(location)
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the HTTP driver and the CSV sink
/// 2. Install the Ctrl-C handler
/// 3. Crawl listing and detail pages, flushing records as they are found
/// 4. Resolve emails for the collected records
/// 5. Write the deduplicated output and release the driver
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunOutcome)` - The run finished, possibly interrupted
/// * `Err(HarvestError)` - The run could not start or its output could not be written
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::load_config;
/// use listing_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let outcome = run_crawl(config).await?;
/// println!("{} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<RunOutcome> {
    let interrupt = Interrupt::new();
    interrupt.listen_for_ctrl_c();
    let mut coordinator = Coordinator::new(config)?.with_interrupt(interrupt);
    coordinator.run().await
}
