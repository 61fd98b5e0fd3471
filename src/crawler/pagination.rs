//! Pagination traversal across listing pages

use crate::browser::BrowserDriver;
use crate::crawler::navigator::Navigator;
use crate::dom::{Element, PageSnapshot};
use crate::state::CrawlSession;
use crate::url::resolve_link;
use crate::Result;
use url::Url;

/// Explicit next-page relations
const REL_NEXT: &str = "a[rel~='next'][href], link[rel~='next'][href]";

/// Containers whose class marks a next-page control
const NEXT_CONTAINERS: &str = "[class*='next'] a[href], [class*='weiter'] a[href]";

/// Words that label a next-page link
pub const NEXT_PAGE_WORDS: &[&str] = &["weiter", "nächste", "next"];

/// Glyphs that label a next-page link on their own
pub const NEXT_PAGE_GLYPHS: &[&str] = &[">", "▶", "→", "»", "›"];

/// Query parameters that carry a page number
pub const PAGE_PARAMS: &[&str] = &["page", "seite", "p"];

/// Result of a pagination step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The next listing page is shown
    Moved(Url),
    /// Traversal is over; not an error
    NoMorePages,
}

/// Returns true if the link points backwards
fn is_previous_link(link: &Element<'_>) -> bool {
    let rel = link.attr("rel").unwrap_or("").to_lowercase();
    if rel.split_whitespace().any(|r| r == "prev" || r == "previous") {
        return true;
    }
    let class = link.attr("class").unwrap_or("").to_lowercase();
    class.contains("prev") || class.contains("zurueck") || class.contains("zurück")
}

/// Returns true if the visible text or label announces the next page
fn has_next_label(link: &Element<'_>) -> bool {
    let labels = [
        link.search_text(),
        link.attr("aria-label").unwrap_or("").to_string(),
        link.attr("title").unwrap_or("").to_string(),
    ];

    labels.iter().any(|label| {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return false;
        }
        if NEXT_PAGE_WORDS.iter().any(|w| label.contains(w)) {
            return true;
        }
        label
            .split_whitespace()
            .all(|part| NEXT_PAGE_GLYPHS.contains(&part))
    })
}

/// Page number carried by the URL's query, if any
pub fn page_number(url: &Url) -> Option<u32> {
    url.query_pairs().find_map(|(key, value)| {
        PAGE_PARAMS
            .contains(&&*key)
            .then(|| value.parse::<u32>().ok())
            .flatten()
    })
}

/// Finds the URL of the page after `current_page` on a listing snapshot
///
/// Sources, in order:
/// 1. a `rel="next"` link
/// 2. a link labelled as next page by text, glyph, or a next-page container
/// 3. any link whose page parameter equals `current_page + 1`
///
/// Relative hrefs are resolved against the snapshot URL.
///
/// # Example
///
/// ```
/// use listing_harvester::crawler::next_page_url;
/// use listing_harvester::dom::PageSnapshot;
/// use url::Url;
///
/// let base = Url::parse("https://dir.example.org/suche/maler/koeln").unwrap();
/// let snapshot = PageSnapshot::parse(r#"<a rel="next" href="?page=2">2</a>"#, base).unwrap();
/// assert_eq!(
///     next_page_url(&snapshot, 1).unwrap().as_str(),
///     "https://dir.example.org/suche/maler/koeln?page=2"
/// );
/// ```
pub fn next_page_url(snapshot: &PageSnapshot, current_page: u32) -> Option<Url> {
    let base = snapshot.url();
    let resolve = |link: &Element<'_>| {
        link.attr("href")
            .and_then(|href| resolve_link(href, base))
            .filter(|url| url != base)
    };

    if let Some(url) = snapshot.query(REL_NEXT).iter().find_map(resolve) {
        tracing::debug!("Next page via rel=next: {}", url);
        return Some(url);
    }

    let links = snapshot.query("a[href]");

    if let Some(url) = links
        .iter()
        .filter(|link| !is_previous_link(link) && has_next_label(link))
        .find_map(resolve)
    {
        tracing::debug!("Next page via link label: {}", url);
        return Some(url);
    }

    if let Some(url) = snapshot
        .query(NEXT_CONTAINERS)
        .iter()
        .filter(|link| !is_previous_link(link))
        .find_map(resolve)
    {
        tracing::debug!("Next page via next-page container: {}", url);
        return Some(url);
    }

    let wanted = current_page.saturating_add(1);
    let url = links
        .iter()
        .filter_map(resolve)
        .find(|url| page_number(url) == Some(wanted));
    if let Some(url) = &url {
        tracing::debug!("Next page via page parameter: {}", url);
    }
    url
}

/// Moves to the next listing page if there is one
///
/// Stops when the page cap is reached, no next link exists, or the next link
/// was already visited this run.
pub async fn advance<D: BrowserDriver>(
    navigator: &mut Navigator<D>,
    session: &mut CrawlSession,
    max_pages: u32,
) -> Result<Advance> {
    if session.page_count() >= max_pages {
        tracing::info!("Page limit of {} reached", max_pages);
        return Ok(Advance::NoMorePages);
    }

    let next = {
        let snapshot = navigator.snapshot()?;
        next_page_url(&snapshot, session.page_count())
    };

    let Some(next) = next else {
        tracing::info!("No more pages after page {}", session.page_count());
        return Ok(Advance::NoMorePages);
    };

    if session.is_visited(&next) {
        tracing::info!("Next page {} was already visited, stopping", next);
        return Ok(Advance::NoMorePages);
    }

    navigator.enter_listing(session, &next).await?;
    Ok(Advance::Moved(next))
}
