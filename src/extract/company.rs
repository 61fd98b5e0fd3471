//! Field waterfalls for a directory detail page
//!
//! Patterns run from the directory's own markup to generic HTML.

use crate::dom::PageSnapshot;
use crate::extract::strategy::{first_attr, first_text, Waterfall};
use crate::output::CompanyRecord;
use crate::url::{is_valid_external_url, resolve_link, DirectoryOrigin};
use regex::Regex;
use std::sync::LazyLock;

/// Free-text phone shapes, tried in order
static PHONE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\+49[\s-]*\d+[\s\d-]+",
        r"0\d+[\s\d-]+",
        r"\d{3,5}[\s/-]*\d{4,8}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Shortest accepted free-text phone match (exclusive)
const MIN_PHONE_LEN: usize = 8;

pub fn name_waterfall() -> Waterfall<String> {
    Waterfall::new("name")
        .with("h1.title", |s| first_text(s, "h1.title"))
        .with("h1.detail-card-title", |s| first_text(s, "h1.detail-card-title"))
        .with("h1.company-name", |s| first_text(s, "h1.company-name"))
        .with("h1[itemprop=name]", |s| first_text(s, "h1[itemprop='name']"))
        .with(".company-title h1", |s| first_text(s, ".company-title h1"))
}

pub fn address_waterfall() -> Waterfall<String> {
    Waterfall::new("address")
        .with("location-icon label", location_label)
        .with(".detail-card-address", |s| first_text(s, ".detail-card-address"))
        .with("address", |s| first_text(s, "address"))
        .with("[itemprop=address]", |s| first_text(s, "[itemprop='address']"))
        .with(".company-address", |s| first_text(s, ".company-address"))
}

pub fn phone_waterfall() -> Waterfall<String> {
    Waterfall::new("phone")
        .with("tel: link", tel_link)
        .with("[data-phone]", |s| first_attr(s, "[data-phone]", "data-phone"))
        .with("[itemprop=telephone]", |s| {
            first_attr(s, "[itemprop='telephone']", "content")
                .or_else(|| first_text(s, "[itemprop='telephone']"))
        })
        .with(".phone-number", |s| first_text(s, ".phone-number"))
        .with("phone pattern", phone_in_text)
}

pub fn website_waterfall() -> Waterfall<String> {
    Waterfall::new("website")
        .with("tracking website link", |s| {
            link_target(s, "a.tracking--entry-detail-website-link")
        })
        .with("a.detail-card-website", |s| link_target(s, "a.detail-card-website"))
        .with("a[itemprop=url]", |s| link_target(s, "a[itemprop='url']"))
        .with(".company-website a", |s| link_target(s, ".company-website a"))
        .with("external link", external_link)
}

/// Label next to the location icon in the detail list
fn location_label(snapshot: &PageSnapshot) -> Option<String> {
    snapshot
        .query(".entry-detail-list__item")
        .into_iter()
        .filter(|item| {
            item.select_first(".entry-detail-list__icon--location")
                .is_some()
        })
        .filter_map(|item| item.select_first(".entry-detail-list__label"))
        .map(|label| label.search_text())
        .find(|text| !text.is_empty())
}

fn tel_link(snapshot: &PageSnapshot) -> Option<String> {
    snapshot
        .query("a[href]")
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .find_map(|href| {
            let href = href.trim();
            let scheme = href.get(..4)?;
            if !scheme.eq_ignore_ascii_case("tel:") {
                return None;
            }
            Some(href.get(4..)?.trim().to_string()).filter(|p| !p.is_empty())
        })
}

/// Last resort: phone-shaped text anywhere on the page
pub fn phone_in_text(snapshot: &PageSnapshot) -> Option<String> {
    find_phone(&snapshot.full_text())
}

/// First phone-shaped match longer than eight characters
pub fn find_phone(text: &str) -> Option<String> {
    PHONE_RES.iter().find_map(|re| {
        re.find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .find(|m| m.len() > MIN_PHONE_LEN)
    })
}

fn link_target(snapshot: &PageSnapshot, pattern: &str) -> Option<String> {
    snapshot
        .query(pattern)
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .find_map(|href| resolve_link(href, snapshot.url()))
        .map(|url| url.to_string())
}

/// First link leaving the directory that is not a social profile
fn external_link(snapshot: &PageSnapshot) -> Option<String> {
    let origin = DirectoryOrigin::from_url(snapshot.url())?;
    snapshot
        .query("a[href]")
        .into_iter()
        .filter_map(|a| a.attr("href"))
        .filter_map(|href| resolve_link(href, snapshot.url()))
        .find(|url| is_valid_external_url(url, &origin))
        .map(|url| url.to_string())
}

/// Field waterfalls for a detail page, built once per run
#[derive(Debug)]
pub struct CompanyExtractor {
    name: Waterfall<String>,
    address: Waterfall<String>,
    phone: Waterfall<String>,
    website: Waterfall<String>,
}

impl Default for CompanyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanyExtractor {
    pub fn new() -> Self {
        Self {
            name: name_waterfall(),
            address: address_waterfall(),
            phone: phone_waterfall(),
            website: website_waterfall(),
        }
    }

    /// Extracts one company from a detail-page snapshot
    ///
    /// # Returns
    ///
    /// * `Some(CompanyRecord)` - Name or address was found; `detail_url` is the snapshot URL
    /// * `None` - The page carries no recognizable company markup
    pub fn extract(&self, snapshot: &PageSnapshot) -> Option<CompanyRecord> {
        let name = self.name.resolve(snapshot).unwrap_or_default();
        let address = self.address.resolve(snapshot).unwrap_or_default();

        if name.is_empty() && address.is_empty() {
            tracing::debug!("No company markup on {}", snapshot.url());
            return None;
        }

        Some(CompanyRecord {
            name,
            address,
            website: self.website.resolve(snapshot),
            phone: self.phone.resolve(snapshot),
            email: None,
            detail_url: Some(snapshot.url().clone()),
        })
    }
}
