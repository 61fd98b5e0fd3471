//! Crawler module for walking a business directory
//!
//! This module contains the core crawling logic, including:
//! - Navigation between listing and detail pages with retry and backoff
//! - Request pacing
//! - Pagination traversal
//! - Email resolution across detail page, website and imprint
//! - Overall crawl coordination

mod backoff;
mod coordinator;
mod navigator;
mod pacer;
mod pagination;
mod resolver;

pub use backoff::BackoffPolicy;
pub use coordinator::{run_crawl, Coordinator, Interrupt, RunOutcome};
pub use navigator::{
    Navigator, OpenOutcome, CONSENT_BUTTONS, DETAIL_INDICATORS, ENTRY_LINKS,
    LISTING_INDICATORS,
};
pub use pacer::Pacer;
pub use pagination::{advance, next_page_url, page_number, Advance};
pub use resolver::{EmailResolver, EmailSource, PageOutcome};
