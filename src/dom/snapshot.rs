use crate::dom::{collapse_whitespace, parse_selector, Element};
use crate::RenderError;
use scraper::Html;
use url::Url;

/// A parsed, read-only copy of the page the browser surface is showing
///
/// Queries never fail: an unknown pattern or a missing element yields an
/// empty result. The snapshot is `!Send` (the parsed tree is not thread-safe),
/// so it is meant to be built, read and dropped between two awaits.
pub struct PageSnapshot {
    url: Url,
    document: Html,
}

impl std::fmt::Debug for PageSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSnapshot").field("url", &self.url.as_str()).finish()
    }
}

impl PageSnapshot {
    /// Parses an HTML document loaded from `url`
    ///
    /// # Returns
    ///
    /// * `Ok(PageSnapshot)` - The document could be parsed
    /// * `Err(RenderError::Empty)` - The body is empty or whitespace only
    ///
    /// # Example
    ///
    /// ```
    /// use listing_harvester::dom::PageSnapshot;
    /// use url::Url;
    ///
    /// let html = r#"<html><body><h1 class="title">Malerbetrieb Schulz</h1></body></html>"#;
    /// let snapshot = PageSnapshot::parse(html, Url::parse("https://dir.example/d/1").unwrap()).unwrap();
    /// let title = snapshot.query_first(&["h1.title", "h1"]).unwrap();
    /// assert_eq!(title.text(), "Malerbetrieb Schulz");
    /// ```
    pub fn parse(html: &str, url: Url) -> Result<Self, RenderError> {
        if html.trim().is_empty() {
            return Err(RenderError::Empty {
                url: url.to_string(),
            });
        }

        Ok(Self {
            url,
            document: Html::parse_document(html),
        })
    }

    /// URL the document was loaded from
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All elements matching the pattern, in document order
    pub fn query(&self, pattern: &str) -> Vec<Element<'_>> {
        match parse_selector(pattern) {
            Some(selector) => self.document.select(&selector).map(Element::new).collect(),
            None => Vec::new(),
        }
    }

    /// First element of the first pattern that matches anything
    ///
    /// Patterns are tried in order, so the most specific pattern should come first.
    pub fn query_first(&self, patterns: &[&str]) -> Option<Element<'_>> {
        patterns.iter().find_map(|pattern| {
            let selector = parse_selector(pattern)?;
            self.document.select(&selector).next().map(Element::new)
        })
    }

    /// All matches of the first pattern that matches anything, with that pattern
    ///
    /// Unlike a joined selector group, nested elements matched by different
    /// patterns are never counted twice.
    pub fn query_any<'p>(&self, patterns: &[&'p str]) -> Option<(&'p str, Vec<Element<'_>>)> {
        patterns.iter().find_map(|pattern| {
            let found = self.query(pattern);
            (!found.is_empty()).then_some((*pattern, found))
        })
    }

    /// Returns true if at least one element matches the pattern
    pub fn exists(&self, pattern: &str) -> bool {
        parse_selector(pattern)
            .map(|selector| self.document.select(&selector).next().is_some())
            .unwrap_or(false)
    }

    /// Returns true if any of the patterns matches
    pub fn exists_any(&self, patterns: &[&str]) -> bool {
        patterns.iter().any(|p| self.exists(p))
    }

    /// Text of an element, whitespace collapsed
    pub fn text(&self, element: &Element<'_>) -> String {
        element.text()
    }

    /// Attribute of an element
    pub fn attribute<'a>(&self, element: &Element<'a>, name: &str) -> Option<&'a str> {
        element.attr(name)
    }

    /// Whole-page text with text nodes separated by spaces
    pub fn full_text(&self) -> String {
        let body = self.query_first(&["body"]);
        match body {
            Some(body) => body.search_text(),
            None => collapse_whitespace(&self.document.root_element().text().collect::<Vec<_>>().join(" ")),
        }
    }
}
