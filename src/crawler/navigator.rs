//! Navigator - drives the browser surface between listing and detail pages
//!
//! Every navigation goes through the same path: pause, load, check the page is
//! what we expect, and back off before trying again.

use crate::browser::{BrowserDriver, DriverError, Locator, NavigationResponse, Visibility, WaitCondition};
use crate::config::Config;
use crate::crawler::backoff::BackoffPolicy;
use crate::crawler::pacer::Pacer;
use crate::dom::PageSnapshot;
use crate::state::{CrawlSession, PageKind};
use crate::url::resolve_link;
use crate::{HarvestError, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Structural markers of a listing page
pub const LISTING_INDICATORS: &[&str] = &[
    "div.result-list-entry__container",
    "div.result-list-entry-wrapper",
    "article[data-entry-id]",
    ".search-entry",
    ".business-entry",
];

/// Links from a listing entry to its detail page, most specific first
pub const ENTRY_LINKS: &[&str] = &[
    "a.result-list-entry-title",
    "a.entry-detail-link",
    "h2 a",
    "a[title*='in']",
];

/// Structural markers of a detail page
pub const DETAIL_INDICATORS: &[&str] = &[
    "div[class*='company-detail']",
    ".company-profile",
    "section[class*='detail']",
    ".entry-detail-list",
    "h1.title",
    ".company-title h1",
];

/// Cookie-consent accept buttons
pub const CONSENT_BUTTONS: &[&str] = &[
    "#cmpwelcomebtnyes",
    ".cmpboxbtnyes",
    "[aria-label='Alle akzeptieren']",
    "#onetrust-accept-btn-handler",
];

/// Base name of the debug capture written when a listing cannot be entered
const DEBUG_CAPTURE_NAME: &str = "page_on_timeout";

/// How the detail page of a listing entry is reached
#[derive(Debug, Clone, PartialEq, Eq)]
enum DetailTarget {
    Link(Url),
    Click(Locator),
    Missing,
}

/// Result of trying to open a listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The detail page is shown
    Opened(Url),
    /// The listing has no entry at the requested position
    Missing,
    /// The entry's detail page was already visited this run
    AlreadyVisited(Url),
}

/// Owns the browser surface and moves it through the page-state machine
pub struct Navigator<D: BrowserDriver> {
    driver: D,
    policy: BackoffPolicy,
    pacer: Pacer,
    navigation_timeout: Duration,
    selector_timeout: Duration,
    consent_timeout: Duration,
    settle_delay: Duration,
    debug_dir: Option<PathBuf>,
    consent_handled: bool,
    backoff_delays: Vec<Duration>,
}

impl<D: BrowserDriver> Navigator<D> {
    /// Creates a navigator over `driver` with the run's timeouts and pacing
    pub fn new(driver: D, config: &Config) -> Self {
        Self {
            driver,
            policy: BackoffPolicy::from_config(&config.scraping.retry),
            pacer: Pacer::from_config(&config.scraping),
            navigation_timeout: Duration::from_millis(config.browser.navigation_timeout_ms),
            selector_timeout: Duration::from_millis(config.browser.selector_timeout_ms),
            consent_timeout: Duration::from_millis(config.browser.consent_timeout_ms),
            settle_delay: Duration::from_millis(config.browser.settle_delay_ms),
            debug_dir: config
                .output
                .debug_captures
                .then(|| PathBuf::from(&config.output.directory)),
            consent_handled: false,
            backoff_delays: Vec::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Backoff delays slept so far, in order
    pub fn backoff_delays(&self) -> &[Duration] {
        &self.backoff_delays
    }

    /// Navigation timeout used for directory pages
    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    /// Parses the page currently shown
    pub fn snapshot(&self) -> std::result::Result<PageSnapshot, DriverError> {
        self.driver.snapshot()
    }

    /// Returns true if the current page carries any of `patterns`
    fn page_has_any(&self, patterns: &[&str]) -> bool {
        self.driver
            .snapshot()
            .map(|snapshot| snapshot.exists_any(patterns))
            .unwrap_or(false)
    }

    /// Waits until any of `patterns` is present
    async fn wait_for_any(
        &mut self,
        patterns: &[&str],
        timeout: Duration,
    ) -> std::result::Result<(), DriverError> {
        let group = patterns.join(", ");
        self.driver
            .wait_for_selector(&group, timeout, Visibility::Attached)
            .await
    }

    /// Loads `url`, retrying with backoff until it answers and shows `ready`
    ///
    /// # Arguments
    ///
    /// * `url` - Page to load
    /// * `timeout` - Per-attempt load timeout
    /// * `ready` - Structural markers that must be present, if any
    ///
    /// # Returns
    ///
    /// * `Ok(NavigationResponse)` - The page loaded with a non-error status
    /// * `Err(HarvestError::Navigation)` - Every attempt failed
    pub async fn goto_with_retry(
        &mut self,
        url: &Url,
        timeout: Duration,
        ready: Option<&[&str]>,
    ) -> Result<NavigationResponse> {
        self.pacer.wait().await;

        let mut attempt = 0;
        let reason = loop {
            attempt += 1;
            tracing::debug!(
                "Navigating to {} (attempt {}/{})",
                url,
                attempt,
                self.policy.max_attempts()
            );

            let failure = match self.driver.goto(url, WaitCondition::DomContentLoaded, timeout).await {
                Ok(response) if response.ok => match ready {
                    None => return Ok(response),
                    Some(patterns) => match self.wait_for_any(patterns, self.selector_timeout).await {
                        Ok(()) => return Ok(response),
                        Err(e) => e,
                    },
                },
                Ok(response) => DriverError::Http(format!("status {}", response.status)),
                Err(e) => e,
            };

            tracing::warn!("Navigation attempt {} to {} failed: {}", attempt, url, failure);

            if !failure.is_transient() || !self.policy.should_retry(attempt) {
                break failure.to_string();
            }

            let delay = self.policy.delay_for(attempt);
            tracing::debug!("Backing off {:.2}s before retrying {}", delay.as_secs_f64(), url);
            self.backoff_delays.push(delay);
            tokio::time::sleep(delay).await;
        };

        Err(HarvestError::Navigation {
            url: url.to_string(),
            attempts: attempt,
            reason,
        })
    }

    /// Enters a listing page: `Unknown`/`Listing` to `Listing`
    ///
    /// Counts the page, and handles the cookie banner the first time a listing
    /// is shown. On failure the session drops to `Unknown` and a debug capture
    /// is written.
    pub async fn enter_listing(
        &mut self,
        session: &mut CrawlSession,
        url: &Url,
    ) -> Result<NavigationResponse> {
        let response = match self
            .goto_with_retry(url, self.navigation_timeout, Some(LISTING_INDICATORS))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Could not enter listing {}: {}", url, e);
                session.reset();
                self.capture_debug().await;
                return Err(e);
            }
        };

        let shown = self.driver.current_url().unwrap_or_else(|| url.clone());
        session.mark_visited(url);
        session.mark_visited(&shown);
        session.transition(PageKind::Listing)?;
        session.set_last_listing_url(shown.clone());
        session.increment_page_count();
        tracing::info!("Listing page {} loaded: {}", session.page_count(), shown);

        if !self.consent_handled {
            self.consent_handled = true;
            self.accept_consent().await;
        }

        Ok(response)
    }

    /// Best-effort click on a cookie-consent button
    async fn accept_consent(&mut self) {
        for pattern in CONSENT_BUTTONS {
            if self
                .driver
                .wait_for_selector(pattern, self.consent_timeout, Visibility::Visible)
                .await
                .is_err()
            {
                continue;
            }
            match self.driver.click(&Locator::css(*pattern)).await {
                Ok(()) => {
                    tracing::info!("Accepted cookie consent");
                    return;
                }
                Err(e) => tracing::debug!("Consent button {} not clickable: {}", pattern, e),
            }
        }
        tracing::debug!("No cookie consent banner found");
    }

    /// Writes the current document (and a screenshot, if supported) for debugging
    async fn capture_debug(&mut self) {
        let Some(dir) = self.debug_dir.clone() else {
            return;
        };
        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!("Cannot create debug directory {}: {}", dir.display(), e);
            return;
        }

        let html = dir.join(format!("{}.html", DEBUG_CAPTURE_NAME));
        match self.driver.dump_html(&html).await {
            Ok(()) => tracing::info!("Saved page content to {}", html.display()),
            Err(e) => tracing::warn!("Failed to save page content: {}", e),
        }

        let png = dir.join(format!("{}.png", DEBUG_CAPTURE_NAME));
        match self.driver.screenshot(&png).await {
            Ok(()) => tracing::info!("Saved screenshot to {}", png.display()),
            Err(e) => tracing::debug!("No screenshot taken: {}", e),
        }
    }

    /// Finds how entry `index` of the current listing leads to its detail page
    fn detail_target(&self, index: usize) -> std::result::Result<DetailTarget, DriverError> {
        let snapshot = self.driver.snapshot()?;

        let (pattern, href) = match snapshot.query_any(LISTING_INDICATORS) {
            Some((pattern, entries)) => {
                let Some(entry) = entries.get(index) else {
                    return Ok(DetailTarget::Missing);
                };
                let href = ENTRY_LINKS
                    .iter()
                    .filter_map(|link| entry.select_first(link))
                    .find_map(|a| a.attr_non_empty("href"));
                (pattern, href)
            }
            None => {
                // No entry containers: take the n-th detail link on the page
                let Some((pattern, links)) = snapshot.query_any(ENTRY_LINKS) else {
                    return Ok(DetailTarget::Missing);
                };
                let Some(link) = links.get(index) else {
                    return Ok(DetailTarget::Missing);
                };
                (pattern, link.attr_non_empty("href"))
            }
        };

        match href.and_then(|h| resolve_link(&h, snapshot.url())) {
            Some(url) => Ok(DetailTarget::Link(url)),
            None => Ok(DetailTarget::Click(Locator::nth(pattern, index))),
        }
    }

    /// Opens entry `index` of the current listing: `Listing` to `Detail`
    ///
    /// # Returns
    ///
    /// * `Ok(OpenOutcome::Opened(url))` - The detail page is shown
    /// * `Ok(OpenOutcome::Missing)` - No such entry or no way to open it; not retried
    /// * `Ok(OpenOutcome::AlreadyVisited(url))` - Skipped, the page was seen before
    /// * `Err(HarvestError)` - The detail page failed to load
    pub async fn open_result(
        &mut self,
        session: &mut CrawlSession,
        index: usize,
    ) -> Result<OpenOutcome> {
        if session.page_kind() != PageKind::Listing {
            return Err(HarvestError::InvalidTransition {
                from: session.page_kind(),
                to: PageKind::Detail,
            });
        }

        if let Some(listing) = self.driver.current_url() {
            session.set_last_listing_url(listing);
        }

        let detail_url = match self.detail_target(index)? {
            DetailTarget::Missing => {
                tracing::info!("No listing entry at position {}", index + 1);
                return Ok(OpenOutcome::Missing);
            }
            DetailTarget::Link(url) => {
                if session.is_visited(&url) {
                    tracing::debug!("Detail page already visited: {}", url);
                    return Ok(OpenOutcome::AlreadyVisited(url));
                }
                self.goto_with_retry(&url, self.navigation_timeout, None).await?;
                self.driver.current_url().unwrap_or(url)
            }
            DetailTarget::Click(locator) => {
                let before = self.driver.current_url();
                self.pacer.wait().await;
                self.driver.click(&locator).await?;
                match self.driver.current_url() {
                    Some(url) if Some(&url) != before.as_ref() => url,
                    _ => {
                        tracing::info!("Clicking entry {} did not open a detail page", index + 1);
                        return Ok(OpenOutcome::Missing);
                    }
                }
            }
        };

        session.mark_visited(&detail_url);
        session.transition(PageKind::Detail)?;
        session.set_current_detail_url(detail_url.clone());
        tracing::info!("Opened detail page {}", detail_url);
        Ok(OpenOutcome::Opened(detail_url))
    }

    /// Lets a freshly opened detail page settle
    ///
    /// Waits for any detail marker (absence is not an error), then pauses for
    /// the configured settle delay.
    pub async fn stabilize_detail(&mut self) {
        if let Err(e) = self.wait_for_any(DETAIL_INDICATORS, self.selector_timeout).await {
            tracing::debug!("No detail marker appeared: {}", e);
        }
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    /// Goes back to the listing the current detail page was opened from
    ///
    /// Native back navigation is tried first; if it fails or does not land on
    /// a listing page, the saved listing URL is loaded again.
    pub async fn return_to_listing(&mut self, session: &mut CrawlSession) -> Result<()> {
        match self
            .driver
            .go_back(WaitCondition::DomContentLoaded, self.navigation_timeout)
            .await
        {
            Ok(()) if self.page_has_any(LISTING_INDICATORS) => {
                tracing::debug!("Returned to listing via history");
                return session.transition(PageKind::Listing);
            }
            Ok(()) => tracing::debug!("Back navigation did not land on a listing page"),
            Err(e) => tracing::debug!("Back navigation failed: {}", e),
        }

        let Some(listing) = session.last_listing_url().cloned() else {
            session.reset();
            return Err(HarvestError::Navigation {
                url: String::new(),
                attempts: 0,
                reason: "no listing page to return to".to_string(),
            });
        };

        match self
            .goto_with_retry(&listing, self.navigation_timeout, Some(LISTING_INDICATORS))
            .await
        {
            Ok(_) => {
                tracing::debug!("Returned to listing by reloading {}", listing);
                session.transition(PageKind::Listing)
            }
            Err(e) => {
                session.reset();
                Err(e)
            }
        }
    }

    /// Loads a page outside the directory, such as a company website
    ///
    /// The session leaves the directory (`Unknown`) and the page is marked
    /// visited whether or not it loads.
    pub async fn visit(
        &mut self,
        session: &mut CrawlSession,
        url: &Url,
        timeout: Duration,
    ) -> Result<NavigationResponse> {
        session.transition(PageKind::Unknown)?;
        session.mark_visited(url);
        let response = self.goto_with_retry(url, timeout, None).await?;
        if let Some(shown) = self.driver.current_url() {
            session.mark_visited(&shown);
        }
        Ok(response)
    }

    /// Releases the browser surface
    pub async fn close(&mut self) {
        match self.driver.close().await {
            Ok(()) => tracing::debug!("Browser driver closed"),
            Err(e) => tracing::warn!("Failed to close browser driver: {}", e),
        }
    }
}
