//! Listing-Harvester: a resilient business-directory crawler
//!
//! This crate walks the paginated listing pages of a business directory, opens
//! each entry's detail page, extracts the company's contact data and resolves an
//! email address through the directory page, the company website and the
//! website's imprint page, in that order.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod dom;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation to {url} failed after {attempts} attempt(s): {reason}")]
    Navigation {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Browser driver error: {0}")]
    Driver(#[from] browser::DriverError),

    #[error("Record sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("Invalid page transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageKind,
        to: state::PageKind,
    },

    #[error("Crawl interrupted")]
    Interrupted,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// A page snapshot that cannot be queried at all
///
/// Absence of a match is never a `RenderError`; only a document that is
/// missing or unusable as HTML is.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Empty document at {url}")]
    Empty { url: String },

    #[error("Document at {url} is not HTML ({content_type})")]
    NotHtml { url: String, content_type: String },
}

/// Result type alias for Listing-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator, Interrupt, RunOutcome};
pub use output::CompanyRecord;
pub use state::{CrawlSession, PageKind};
