//! URL handling module for Listing-Harvester
//!
//! This module provides domain extraction, domain matching, link resolution and
//! the classification that decides whether a link points back into the
//! directory, to a social network, or to a company's own website.

mod domain;
mod links;
mod matcher;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, strip_www};
pub use links::{resolve_link, visit_key};
pub use matcher::matches_domain;

/// Social networks that are never accepted as a company website
pub const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "xing.com",
    "youtube.com",
];

/// Link classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Points into the directory being crawled
    Directory,
    /// Points to a social network profile
    Social,
    /// Points to any other site
    External,
}

impl LinkClass {
    /// Returns true if the link may be used as a company website or imprint page
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External)
    }
}

/// Host and port of the directory being crawled
///
/// Built once from the configured base URL. A leading `www.` is ignored, and
/// the port only takes part in the comparison when the base URL names one
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryOrigin {
    host: String,
    port: Option<u16>,
}

impl DirectoryOrigin {
    /// Creates the origin from the directory's base URL
    ///
    /// # Returns
    ///
    /// * `Some(DirectoryOrigin)` - The URL has a host
    /// * `None` - The URL has no host
    pub fn from_url(base_url: &Url) -> Option<Self> {
        let host = base_url.host_str()?;
        Some(Self {
            host: strip_www(host),
            port: base_url.port(),
        })
    }

    /// The directory host without `www.`
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if the URL belongs to the directory (any subdomain included)
    pub fn contains(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        if !matches_domain(&self.host, &strip_www(host)) {
            return false;
        }
        match self.port {
            Some(port) => url.port_or_known_default() == Some(port),
            None => true,
        }
    }
}

/// Classifies a link relative to the directory
///
/// Priority order:
/// 1. Directory (the crawled site itself)
/// 2. Social network
/// 3. External (default)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::{classify_link, DirectoryOrigin, LinkClass};
///
/// let origin = DirectoryOrigin::from_url(&Url::parse("https://www.11880.com").unwrap()).unwrap();
///
/// let own = Url::parse("https://www.11880.com/branchenbuch/koeln/123.html").unwrap();
/// assert_eq!(classify_link(&own, &origin), LinkClass::Directory);
///
/// let social = Url::parse("https://de-de.facebook.com/malerbetrieb").unwrap();
/// assert_eq!(classify_link(&social, &origin), LinkClass::Social);
///
/// let site = Url::parse("https://malerbetrieb-schulz.de/").unwrap();
/// assert_eq!(classify_link(&site, &origin), LinkClass::External);
/// ```
pub fn classify_link(url: &Url, origin: &DirectoryOrigin) -> LinkClass {
    if origin.contains(url) {
        return LinkClass::Directory;
    }

    if let Some(host) = extract_domain(url) {
        let host = strip_www(&host);
        if SOCIAL_DOMAINS.iter().any(|d| matches_domain(d, &host)) {
            return LinkClass::Social;
        }
    }

    LinkClass::External
}

/// Validates a URL as a company website or imprint page
///
/// Accepted when it uses http(s), has a host, and is neither part of the
/// directory nor a social network.
pub fn is_valid_external_url(url: &Url, origin: &DirectoryOrigin) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    if url.host_str().is_none() {
        return false;
    }
    classify_link(url, origin).is_external()
}

/// Parses a raw website value and validates it as an external URL
///
/// Scheme-less values such as `www.example.de` are read as `https://`.
pub fn parse_external_url(raw: &str, origin: &DirectoryOrigin) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(::url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", raw.trim_start_matches('/'))).ok()?
        }
        Err(_) => return None,
    };

    if is_valid_external_url(&parsed, origin) {
        Some(parsed)
    } else {
        tracing::debug!("Rejected website URL: {}", raw);
        None
    }
}
