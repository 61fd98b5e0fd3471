//! Five-tier email waterfall
//!
//! Tiers scan from the directory's known email markup outwards to the whole
//! page text:
//! 1. structural email anchors
//! 2. contact-info containers
//! 3. any `mailto:` link
//! 4. contact/imprint/footer regions, by regex
//! 5. full page text, by regex, business-like addresses only

use crate::dom::{Element, PageSnapshot};
use crate::extract::obfuscation::decode_obfuscated;
use crate::extract::strategy::Waterfall;
use crate::extract::validate::{find_emails, is_business_likely, is_organizational, is_valid_email};

pub const TIER_STRUCTURAL: &str = "structural anchor";
pub const TIER_CONTAINER: &str = "contact container";
pub const TIER_MAILTO: &str = "mailto link";
pub const TIER_REGION: &str = "contact region";
pub const TIER_FULL_TEXT: &str = "full text";

const STRUCTURAL_PATTERNS: &[&str] = &[
    "meta[itemprop='email']",
    "#box-email-link",
    ".tracking-mail-to",
    "a.__cf_email__[data-cfemail]",
    "[data-cfemail]",
    ".entry-detail-list__item a[href^='mailto:']",
    "a[title*='@']",
    "[itemprop='email']",
    ".company-email",
];

const CONTAINER_PATTERNS: &[&str] = &[
    ".entry-detail-list__item",
    ".entry-detail-list__wrapper",
    "[class*='email']",
    "[id*='email']",
];

const REGION_PATTERNS: &[&str] = &[
    ".contact",
    ".kontakt",
    ".contact-info",
    ".impressum",
    ".imprint",
    ".footer",
    "footer",
    "[class*='contact']",
    "[class*='kontakt']",
    "[id*='contact']",
    "[id*='kontakt']",
];

/// Builds the email waterfall in tier order
pub fn email_waterfall() -> Waterfall<String> {
    Waterfall::new("email")
        .with(TIER_STRUCTURAL, structural_anchor)
        .with(TIER_CONTAINER, contact_container)
        .with(TIER_MAILTO, mailto_link)
        .with(TIER_REGION, contact_region)
        .with(TIER_FULL_TEXT, full_text)
}

/// Runs the email waterfall once
///
/// # Example
///
/// ```
/// use listing_harvester::dom::PageSnapshot;
/// use listing_harvester::extract::extract_email;
/// use url::Url;
///
/// let html = r#"<footer>Mail: buero@malerbetrieb-schulz.de</footer>"#;
/// let snap = PageSnapshot::parse(html, Url::parse("https://malerbetrieb-schulz.de/").unwrap()).unwrap();
/// let (email, tier) = extract_email(&snap).unwrap();
/// assert_eq!(email, "buero@malerbetrieb-schulz.de");
/// assert_eq!(tier, "contact region");
/// ```
pub fn extract_email(snapshot: &PageSnapshot) -> Option<(String, &'static str)> {
    email_waterfall().run(snapshot)
}

/// Addresses of a `mailto:` href; query and multiple recipients handled
pub fn mailto_addresses(href: &str) -> Vec<String> {
    let href = href.trim();
    let Some(scheme) = href.get(..7) else {
        return Vec::new();
    };
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return Vec::new();
    }
    let rest = &href[7..];
    let recipients = rest.split('?').next().unwrap_or_default();
    recipients
        .split(',')
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect()
}

/// Every address an element may carry, most explicit source first
fn element_candidates(element: &Element<'_>) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(content) = element.attr_non_empty("content") {
        candidates.push(content);
    }
    if let Some(decoded) = element
        .attr("data-cfemail")
        .and_then(decode_obfuscated)
    {
        candidates.push(decoded);
    }
    if let Some(href) = element.attr("href") {
        candidates.extend(mailto_addresses(href));
    }
    if let Some(title) = element.attr("title") {
        candidates.extend(find_emails(title));
    }
    candidates.extend(find_emails(&element.search_text()));
    candidates
}

/// First candidate that passes validation; rejections are logged
fn first_valid(candidates: impl IntoIterator<Item = String>, tier: &str) -> Option<String> {
    candidates.into_iter().find_map(|candidate| {
        let candidate = candidate.trim().trim_end_matches('.').to_string();
        if is_valid_email(&candidate) {
            Some(candidate)
        } else {
            tracing::debug!("Rejected email candidate '{}' ({})", candidate, tier);
            None
        }
    })
}

fn structural_anchor(snapshot: &PageSnapshot) -> Option<String> {
    STRUCTURAL_PATTERNS.iter().find_map(|pattern| {
        snapshot
            .query(pattern)
            .iter()
            .find_map(|el| first_valid(element_candidates(el), TIER_STRUCTURAL))
    })
}

fn contact_container(snapshot: &PageSnapshot) -> Option<String> {
    CONTAINER_PATTERNS.iter().find_map(|pattern| {
        snapshot.query(pattern).iter().find_map(|container| {
            let labelled = container
                .select_first(".entry-detail-list__icon--email")
                .and_then(|_| container.select_first(".entry-detail-list__label"))
                .and_then(|label| first_valid(find_emails(&label.search_text()), TIER_CONTAINER));
            labelled.or_else(|| first_valid(find_emails(&container.search_text()), TIER_CONTAINER))
        })
    })
}

fn mailto_link(snapshot: &PageSnapshot) -> Option<String> {
    snapshot
        .query("a[href]")
        .iter()
        .filter_map(|a| a.attr("href"))
        .find_map(|href| first_valid(mailto_addresses(href), TIER_MAILTO))
}

fn contact_region(snapshot: &PageSnapshot) -> Option<String> {
    REGION_PATTERNS.iter().find_map(|pattern| {
        snapshot
            .query(pattern)
            .iter()
            .find_map(|area| first_valid(find_emails(&area.search_text()), TIER_REGION))
    })
}

fn full_text(snapshot: &PageSnapshot) -> Option<String> {
    let candidates: Vec<String> = find_emails(&snapshot.full_text())
        .into_iter()
        .filter(|c| is_valid_email(c))
        .filter(|c| {
            let business = is_business_likely(c);
            if !business {
                tracing::debug!("Rejected email candidate '{}' ({}): consumer domain", c, TIER_FULL_TEXT);
            }
            business
        })
        .collect();

    candidates
        .iter()
        .find(|c| is_organizational(c))
        .or_else(|| candidates.first())
        .cloned()
}
