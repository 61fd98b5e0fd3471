//! Email candidate filters
//!
//! A candidate is accepted only if it is well formed and not a placeholder.
//! Full-text candidates must additionally look like a business address.

use crate::url::matches_domain;
use regex::Regex;
use std::sync::LazyLock;

/// Finds email-shaped substrings in free text
pub(crate) static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

static WELL_FORMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

/// Domains that only ever appear in sample or test addresses
const PLACEHOLDER_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "example.net",
    "test.com",
    "dummy.com",
];

/// Local-part fragments of unattended mailboxes
const PLACEHOLDER_LOCAL_MARKERS: &[&str] = &["noreply", "no-reply", "donotreply", "webmaster"];

/// Local parts rejected as a whole
const PLACEHOLDER_LOCAL_PARTS: &[&str] = &["admin"];

/// Template text left in page builders
const PLACEHOLDER_PREFIXES: &[&str] = &["info@website"];

/// Free consumer mail providers
pub const PERSONAL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "hotmail.com",
    "web.de",
    "gmx.de",
    "gmx.net",
    "t-online.de",
    "outlook.com",
    "aol.com",
];

/// Local parts that identify an organization's shared mailbox
pub const ORGANIZATIONAL_LOCAL_PARTS: &[&str] = &["info", "kontakt", "office", "mail", "contact"];

/// File extensions that look like a TLD in `logo@2x.png`
const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "css", "js"];

fn split(email: &str) -> Option<(String, String)> {
    let (local, domain) = email.rsplit_once('@')?;
    Some((local.to_lowercase(), domain.to_lowercase()))
}

/// Returns true if the candidate has the shape `local@domain.tld`
///
/// # Examples
///
/// ```
/// use listing_harvester::extract::is_well_formed;
///
/// assert!(is_well_formed("kontakt@stadtwerke-demo.de"));
/// assert!(!is_well_formed("kontakt@stadtwerke-demo"));
/// assert!(!is_well_formed("logo@2x.png"));
/// ```
pub fn is_well_formed(email: &str) -> bool {
    if email.len() < 5 || email.len() > 254 || email.contains("..") {
        return false;
    }
    if !WELL_FORMED_RE.is_match(email) {
        return false;
    }
    let tld = email.rsplit('.').next().unwrap_or_default().to_lowercase();
    !ASSET_EXTENSIONS.contains(&tld.as_str())
}

/// Returns true unless the candidate is a known placeholder address
///
/// # Examples
///
/// ```
/// use listing_harvester::extract::is_not_placeholder;
///
/// assert!(!is_not_placeholder("noreply@example.com"));
/// assert!(!is_not_placeholder("admin@somecorp.com"));
/// assert!(!is_not_placeholder("info@website.com"));
/// assert!(is_not_placeholder("kontakt@stadtwerke-demo.de"));
/// ```
pub fn is_not_placeholder(email: &str) -> bool {
    let Some((local, domain)) = split(email) else {
        return false;
    };
    let lower = email.to_lowercase();

    if PLACEHOLDER_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return false;
    }
    if PLACEHOLDER_DOMAINS.iter().any(|d| matches_domain(d, &domain)) {
        return false;
    }
    if PLACEHOLDER_LOCAL_MARKERS.iter().any(|m| local.contains(m)) {
        return false;
    }
    !PLACEHOLDER_LOCAL_PARTS.contains(&local.as_str())
}

/// Returns true if the candidate passes both filters
pub fn is_valid_email(email: &str) -> bool {
    is_well_formed(email) && is_not_placeholder(email)
}

/// Returns true unless the address belongs to a free consumer mail provider
pub fn is_business_likely(email: &str) -> bool {
    match split(email) {
        Some((_, domain)) => !PERSONAL_DOMAINS.iter().any(|d| matches_domain(d, &domain)),
        None => false,
    }
}

/// Returns true if the local part names a shared organizational mailbox
pub fn is_organizational(email: &str) -> bool {
    split(email)
        .map(|(local, _)| ORGANIZATIONAL_LOCAL_PARTS.contains(&local.as_str()))
        .unwrap_or(false)
}

/// Email-shaped substrings of `text`, in order of appearance
pub fn find_emails(text: &str) -> Vec<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
