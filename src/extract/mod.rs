//! Extraction Waterfall
//!
//! Every field of a company is resolved by an ordered list of strategies,
//! each a pure function of the page snapshot. The first strategy that yields
//! a value wins. A field no strategy can fill is simply absent.

mod company;
mod email;
mod imprint;
mod obfuscation;
mod strategy;
mod validate;

pub use company::{
    address_waterfall, find_phone, name_waterfall, phone_waterfall, website_waterfall,
    CompanyExtractor,
};
pub use email::{
    email_waterfall, extract_email, mailto_addresses, TIER_CONTAINER, TIER_FULL_TEXT,
    TIER_MAILTO, TIER_REGION, TIER_STRUCTURAL,
};
pub use imprint::{find_imprint_link, IMPRINT_KEYWORDS};
pub use obfuscation::{decode_obfuscated, encode_obfuscated};
pub use strategy::{first_attr, first_text, Strategy, Waterfall};
pub use validate::{
    find_emails, is_business_likely, is_not_placeholder, is_organizational, is_valid_email,
    is_well_formed, PERSONAL_DOMAINS,
};
