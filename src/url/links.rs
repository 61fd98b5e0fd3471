use url::Url;

/// Resolves an `href` attribute against the page it was found on
///
/// Returns `None` for links that can never be navigated to:
/// - empty or fragment-only hrefs
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - anything that does not resolve to an http(s) URL
///
/// # Example
///
/// ```
/// use url::Url;
/// use listing_harvester::url::resolve_link;
///
/// let page = Url::parse("https://www.11880.com/suche/maler/koeln").unwrap();
/// let next = resolve_link("?page=2", &page).unwrap();
/// assert_eq!(next.as_str(), "https://www.11880.com/suche/maler/koeln?page=2");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

/// Key under which a URL is recorded as visited
///
/// The fragment never changes the document that is loaded, so it is dropped.
pub fn visit_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}
