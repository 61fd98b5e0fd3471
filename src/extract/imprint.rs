use crate::dom::PageSnapshot;
use crate::url::{is_valid_external_url, resolve_link, DirectoryOrigin};
use url::Url;

/// Link keywords of legal/contact pages, German and English
pub const IMPRINT_KEYWORDS: &[&str] = &[
    "impressum",
    "imprint",
    "kontakt",
    "contact",
    "datenschutz",
    "privacy",
    "rechtliches",
    "legal",
];

/// Finds the imprint or contact page linked from a company website
///
/// Links are scanned in document order; the first one whose href or visible
/// text contains a keyword and that resolves to a valid external URL wins.
///
/// # Example
///
/// ```
/// use listing_harvester::dom::PageSnapshot;
/// use listing_harvester::extract::find_imprint_link;
/// use listing_harvester::url::DirectoryOrigin;
/// use url::Url;
///
/// let origin = DirectoryOrigin::from_url(&Url::parse("https://www.11880.com").unwrap()).unwrap();
/// let html = r#"<nav><a href="/leistungen">Leistungen</a><a href="/impressum.html">Impressum</a></nav>"#;
/// let snap = PageSnapshot::parse(html, Url::parse("https://firma.de/").unwrap()).unwrap();
/// assert_eq!(
///     find_imprint_link(&snap, &origin).unwrap().as_str(),
///     "https://firma.de/impressum.html"
/// );
/// ```
pub fn find_imprint_link(snapshot: &PageSnapshot, origin: &DirectoryOrigin) -> Option<Url> {
    for link in snapshot.query("a[href]") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let href_lower = href.to_lowercase();
        let text_lower = link.text().to_lowercase();

        let matches_keyword = IMPRINT_KEYWORDS
            .iter()
            .any(|k| href_lower.contains(k) || text_lower.contains(k));
        if !matches_keyword {
            continue;
        }

        match resolve_link(href, snapshot.url()) {
            Some(url) if is_valid_external_url(&url, origin) => {
                tracing::debug!("Found imprint link: {}", url);
                return Some(url);
            }
            _ => tracing::debug!("Skipping imprint candidate '{}'", href),
        }
    }
    None
}
