//! Email resolution across detail page, company website and imprint page

use crate::browser::BrowserDriver;
use crate::config::EmailConfig;
use crate::crawler::coordinator::Interrupt;
use crate::crawler::navigator::Navigator;
use crate::dom::PageSnapshot;
use crate::extract::{extract_email, find_imprint_link};
use crate::output::CompanyRecord;
use crate::state::CrawlSession;
use crate::url::{parse_external_url, visit_key, DirectoryOrigin};
use crate::{HarvestError, Result};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Where a resolved email was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailSource {
    DetailPage,
    Website,
    Imprint,
}

impl fmt::Display for EmailSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DetailPage => "detail page",
            Self::Website => "website",
            Self::Imprint => "imprint page",
        };
        write!(f, "{}", name)
    }
}

/// What one loaded page yielded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// Email and the waterfall tier that produced it
    pub email: Option<(String, &'static str)>,
    /// Imprint link found on the page
    pub imprint: Option<Url>,
}

/// Resolves one email per record through the configured sources
///
/// Each page is loaded at most once per run; later records that point to the
/// same page reuse its outcome.
#[derive(Debug)]
pub struct EmailResolver {
    config: EmailConfig,
    origin: DirectoryOrigin,
    detail_timeout: Duration,
    website_timeout: Duration,
    cache: HashMap<String, PageOutcome>,
    interrupt: Interrupt,
}

impl EmailResolver {
    pub fn new(config: &EmailConfig, origin: DirectoryOrigin, detail_timeout: Duration) -> Self {
        Self {
            config: config.clone(),
            origin,
            detail_timeout,
            website_timeout: Duration::from_millis(config.website_timeout_ms),
            cache: HashMap::new(),
            interrupt: Interrupt::new(),
        }
    }

    /// Stops resolution before the next navigation once `interrupt` fires
    pub fn set_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt = interrupt;
    }

    /// Number of pages with a known outcome
    pub fn cached_pages(&self) -> usize {
        self.cache.len()
    }

    /// Returns the cached outcome for `url`
    pub fn cached(&self, url: &Url) -> Option<&PageOutcome> {
        self.cache.get(&visit_key(url))
    }

    /// Runs the email waterfall on a page that is already loaded
    ///
    /// Used for detail pages while the crawl is on them, so the email pass
    /// does not have to load them again.
    pub fn record_page(&mut self, url: &Url, snapshot: &PageSnapshot, find_imprint: bool) -> &PageOutcome {
        let outcome = PageOutcome {
            email: extract_email(snapshot),
            imprint: if find_imprint {
                find_imprint_link(snapshot, &self.origin)
            } else {
                None
            },
        };
        if let Some((email, tier)) = &outcome.email {
            tracing::debug!("Email {} on {} via {}", email, url, tier);
        }
        self.cache.entry(visit_key(url)).or_insert(outcome)
    }

    /// Loads `url` unless its outcome is known, and returns the outcome
    ///
    /// Pages that were visited without being analyzed yield an empty outcome.
    /// A failed load is logged, counted, and cached as empty. No navigation
    /// starts after an interrupt.
    async fn page_outcome<D: BrowserDriver>(
        &mut self,
        navigator: &mut Navigator<D>,
        session: &mut CrawlSession,
        url: &Url,
        timeout: Duration,
        find_imprint: bool,
    ) -> Result<PageOutcome> {
        if let Some(outcome) = self.cached(url) {
            tracing::debug!("Reusing outcome for {}", url);
            return Ok(outcome.clone());
        }
        if session.is_visited(url) {
            tracing::debug!("Not revisiting {}", url);
            return Ok(PageOutcome::default());
        }
        if self.interrupt.is_triggered() {
            return Err(HarvestError::Interrupted);
        }

        if let Err(e) = navigator.visit(session, url, timeout).await {
            tracing::warn!("Could not load {}: {}", url, e);
            session.stats.errors += 1;
            self.cache.insert(visit_key(url), PageOutcome::default());
            return Ok(PageOutcome::default());
        }

        let analyzed = match navigator.snapshot() {
            Ok(snapshot) => Some((
                snapshot.url().clone(),
                PageOutcome {
                    email: extract_email(&snapshot),
                    imprint: if find_imprint {
                        find_imprint_link(&snapshot, &self.origin)
                    } else {
                        None
                    },
                },
            )),
            Err(e) => {
                tracing::debug!("Page {} is not readable: {}", url, e);
                None
            }
        };

        let outcome = match analyzed {
            Some((shown, outcome)) => {
                self.cache.insert(visit_key(&shown), outcome.clone());
                outcome
            }
            None => PageOutcome::default(),
        };
        self.cache.insert(visit_key(url), outcome.clone());
        Ok(outcome)
    }

    /// Finds an email for `record`
    ///
    /// Sources are tried in order and the first valid address wins:
    /// 1. the record's detail page
    /// 2. the company website
    /// 3. the imprint page linked from the website
    ///
    /// # Returns
    ///
    /// * `Ok(Some((email, source)))` - An address was found
    /// * `Ok(None)` - No source produced an address
    /// * `Err(HarvestError::Interrupted)` - An uncached page was due after an interrupt
    pub async fn resolve<D: BrowserDriver>(
        &mut self,
        navigator: &mut Navigator<D>,
        session: &mut CrawlSession,
        record: &CompanyRecord,
    ) -> Result<Option<(String, EmailSource)>> {
        if self.config.from_detail_page {
            if let Some(detail) = &record.detail_url {
                let outcome = self
                    .page_outcome(navigator, session, detail, self.detail_timeout, false)
                    .await?;
                if let Some((email, tier)) = outcome.email {
                    tracing::debug!("{}: email from detail page ({})", record.label(), tier);
                    return Ok(Some((email, EmailSource::DetailPage)));
                }
            }
        }

        if !self.config.from_website {
            return Ok(None);
        }
        let Some(website) = record
            .website
            .as_deref()
            .and_then(|w| parse_external_url(w, &self.origin))
        else {
            tracing::debug!("{}: no usable website", record.label());
            return Ok(None);
        };

        let outcome = self
            .page_outcome(
                navigator,
                session,
                &website,
                self.website_timeout,
                self.config.from_imprint,
            )
            .await?;
        if let Some((email, tier)) = outcome.email {
            tracing::debug!("{}: email from website ({})", record.label(), tier);
            return Ok(Some((email, EmailSource::Website)));
        }

        if !self.config.from_imprint {
            return Ok(None);
        }
        let Some(imprint) = outcome.imprint else {
            tracing::debug!("{}: no imprint link on {}", record.label(), website);
            return Ok(None);
        };

        let outcome = self
            .page_outcome(navigator, session, &imprint, self.website_timeout, false)
            .await?;
        Ok(outcome.email.map(|(email, tier)| {
            tracing::debug!("{}: email from imprint page ({})", record.label(), tier);
            (email, EmailSource::Imprint)
        }))
    }
}
