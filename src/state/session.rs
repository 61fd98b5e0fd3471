use crate::state::PageKind;
use crate::url::visit_key;
use crate::{HarvestError, Result};
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Counters of one crawl run
///
/// Every field only ever increases during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Listing pages successfully entered
    pub pages_processed: u64,

    /// Records extracted from detail pages
    pub companies_found: u64,

    /// Records that ended up with an email address
    pub emails_extracted: u64,

    /// Navigation or extraction failures that were caught and skipped
    pub errors: u64,
}

/// Process-scoped state of one crawl run
///
/// Owned by the coordinator and lent mutably to the navigator, pagination and
/// email resolver in turn, so it is never shared between two operations.
#[derive(Debug)]
pub struct CrawlSession {
    page_kind: PageKind,
    last_listing_url: Option<Url>,
    current_detail_url: Option<Url>,
    visited: HashSet<String>,
    page_count: u32,
    pub stats: RunStats,
    started: Instant,
}

impl Default for CrawlSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlSession {
    /// Creates a session in the `Unknown` state with empty counters
    pub fn new() -> Self {
        Self {
            page_kind: PageKind::Unknown,
            last_listing_url: None,
            current_detail_url: None,
            visited: HashSet::new(),
            page_count: 0,
            stats: RunStats::default(),
            started: Instant::now(),
        }
    }

    /// Current page kind
    pub fn page_kind(&self) -> PageKind {
        self.page_kind
    }

    /// Moves the state machine to `next`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transition is allowed and was applied
    /// * `Err(HarvestError::InvalidTransition)` - The state is left unchanged
    pub fn transition(&mut self, next: PageKind) -> Result<()> {
        if !self.page_kind.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.page_kind,
                to: next,
            });
        }
        if self.page_kind != next {
            tracing::debug!("Page state {} -> {}", self.page_kind, next);
        }
        self.page_kind = next;
        if next != PageKind::Detail {
            self.current_detail_url = None;
        }
        Ok(())
    }

    /// Records a fatal navigation error
    pub fn reset(&mut self) {
        self.page_kind = PageKind::Unknown;
        self.current_detail_url = None;
    }

    /// The listing page to come back to after a detail visit
    pub fn last_listing_url(&self) -> Option<&Url> {
        self.last_listing_url.as_ref()
    }

    pub fn set_last_listing_url(&mut self, url: Url) {
        self.last_listing_url = Some(url);
    }

    /// Detail page currently open, if any
    pub fn current_detail_url(&self) -> Option<&Url> {
        self.current_detail_url.as_ref()
    }

    pub fn set_current_detail_url(&mut self, url: Url) {
        self.current_detail_url = Some(url);
    }

    /// Returns true if the URL was already loaded during this run
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Marks a URL as loaded; returns false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(visit_key(url))
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of listing pages entered so far
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Counts a newly entered listing page
    pub fn increment_page_count(&mut self) {
        self.page_count += 1;
        self.stats.pages_processed += 1;
    }

    /// Time since the session was created
    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}
