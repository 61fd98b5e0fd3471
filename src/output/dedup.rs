//! First-seen-wins de-duplication on normalized name and address

use crate::output::CompanyRecord;
use std::collections::HashSet;

/// Spelling variants folded together before comparing
const VARIANTS: &[(&str, &str)] = &[
    ("&", " und "),
    ("+", " und "),
    ("strasse", "straße"),
    ("str.", "straße"),
    ("co.", "co"),
];

/// Normalizes one key component
///
/// Lowercases, folds the variants above and collapses whitespace.
pub fn normalize_key_part(value: &str) -> String {
    let mut value = value.trim().to_lowercase();
    for (from, to) in VARIANTS {
        value = value.replace(from, to);
    }
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key under which two records count as the same company
///
/// # Example
///
/// ```
/// use listing_harvester::output::{duplicate_key, CompanyRecord};
///
/// let a = CompanyRecord { name: "Meyer & Söhne".into(), address: "Hauptstr. 1".into(), ..Default::default() };
/// let b = CompanyRecord { name: "meyer  und söhne".into(), address: "Hauptstraße 1".into(), ..Default::default() };
/// assert_eq!(duplicate_key(&a), duplicate_key(&b));
/// ```
pub fn duplicate_key(record: &CompanyRecord) -> String {
    format!(
        "{}|{}",
        normalize_key_part(&record.name),
        normalize_key_part(&record.address)
    )
}

/// Drops every record whose key was already seen; order is preserved
pub fn dedup(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
    let before = records.len();
    let mut seen = HashSet::new();
    let unique: Vec<CompanyRecord> = records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(duplicate_key(record));
            if !fresh {
                tracing::debug!("Duplicate dropped: {}", record.label());
            }
            fresh
        })
        .collect();

    let removed = before - unique.len();
    if removed > 0 {
        tracing::info!("Removed {} duplicate entries", removed);
    }
    unique
}
