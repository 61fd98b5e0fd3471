/// Checks if a host belongs to a domain
///
/// A host matches when it equals the domain or is any subdomain of it, so
/// `facebook.com` covers `m.facebook.com` but not `notfacebook.com`.
/// Both arguments are expected to be lowercase.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::matches_domain;
///
/// assert!(matches_domain("facebook.com", "facebook.com"));
/// assert!(matches_domain("facebook.com", "de-de.facebook.com"));
/// assert!(!matches_domain("facebook.com", "notfacebook.com"));
/// ```
pub fn matches_domain(domain: &str, candidate: &str) -> bool {
    if domain.is_empty() || candidate.is_empty() {
        return false;
    }
    candidate == domain
        || candidate
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
