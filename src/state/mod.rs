//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageKind`: which kind of directory page is currently open (listing, detail, unknown)
//! - `CrawlSession`: the run's page state, visited URLs, page counter and statistics
//! - `RunStats`: monotonically increasing counters read at the end of the run

mod page_kind;
mod session;

// Re-export main types
pub use page_kind::PageKind;
pub use session::{CrawlSession, RunStats};
