use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Arguments
///
/// * `url` - The URL to extract the domain from
///
/// # Returns
///
/// * `Some(String)` - The lowercase host
/// * `None` - If the URL has no host (e.g. `mailto:`)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.de/impressum").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.example.de".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Lowercases a host and removes a leading `www.`
///
/// ```
/// use listing_harvester::url::strip_www;
///
/// assert_eq!(strip_www("WWW.11880.com"), "11880.com");
/// assert_eq!(strip_www("shop.example.de"), "shop.example.de");
/// ```
pub fn strip_www(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
