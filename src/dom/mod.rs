//! DOM Query Facade
//!
//! Wraps a parsed page and exposes the few structural queries every extractor
//! needs. Absence is always an empty result, never an error; only a document
//! that cannot be read at all produces a `RenderError`.

mod element;
mod snapshot;

pub use element::Element;
pub use snapshot::PageSnapshot;

use scraper::Selector;

/// Parses a selector pattern, logging invalid patterns instead of failing
pub(crate) fn parse_selector(pattern: &str) -> Option<Selector> {
    match Selector::parse(pattern) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Invalid selector '{}': {:?}", pattern, e);
            None
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
