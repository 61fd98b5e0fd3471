use crate::dom::{collapse_whitespace, parse_selector};
use scraper::ElementRef;

/// One matched element of a page snapshot
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    inner: ElementRef<'a>,
}

impl<'a> Element<'a> {
    pub(crate) fn new(inner: ElementRef<'a>) -> Self {
        Self { inner }
    }

    /// Visible text with whitespace collapsed
    ///
    /// Adjacent text nodes are concatenated as the browser renders them.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.inner.text().collect::<String>())
    }

    /// Text nodes joined by spaces, for regex scanning
    ///
    /// Keeps an address from one node from gluing onto the next node's text.
    pub fn search_text(&self) -> String {
        collapse_whitespace(&self.inner.text().collect::<Vec<_>>().join(" "))
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.inner.value().attr(name)
    }

    /// Trimmed, non-empty attribute value
    pub fn attr_non_empty(&self, name: &str) -> Option<String> {
        self.attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// First descendant matching the pattern
    pub fn select_first(&self, pattern: &str) -> Option<Element<'a>> {
        let selector = parse_selector(pattern)?;
        self.inner.select(&selector).next().map(Element::new)
    }
}
