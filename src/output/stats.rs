//! Statistics for a finished run
//!
//! This module summarizes the exported records and the crawl counters and
//! prints them the way the run log expects.

use crate::output::CompanyRecord;
use crate::state::RunStats;
use std::time::Duration;

/// Field coverage of the exported records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Total number of records written
    pub total: usize,

    pub with_email: usize,
    pub with_website: usize,
    pub with_phone: usize,
}

impl ExportStats {
    /// Counts field coverage over the final record set
    pub fn from_records(records: &[CompanyRecord]) -> Self {
        let filled = |f: fn(&CompanyRecord) -> bool| records.iter().filter(|r| f(r)).count();
        Self {
            total: records.len(),
            with_email: filled(|r| r.email.as_deref().is_some_and(|e| !e.is_empty())),
            with_website: filled(|r| r.website.as_deref().is_some_and(|w| !w.is_empty())),
            with_phone: filled(|r| r.phone.as_deref().is_some_and(|p| !p.is_empty())),
        }
    }

    /// Share of `count` in the total, in percent
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total > 0 {
            (count as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Emails found per company, in percent
pub fn success_rate(stats: &RunStats) -> f64 {
    if stats.companies_found > 0 {
        (stats.emails_extracted as f64 / stats.companies_found as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - Counters of the crawl
/// * `export` - Field coverage of the written file
/// * `elapsed` - Wall-clock duration of the run
pub fn print_statistics(stats: &RunStats, export: &ExportStats, elapsed: Duration) {
    let rate = success_rate(stats);

    tracing::info!(
        "Run finished in {:.1}s: {} pages, {} companies, {} emails ({:.1}%), {} errors",
        elapsed.as_secs_f64(),
        stats.pages_processed,
        stats.companies_found,
        stats.emails_extracted,
        rate,
        stats.errors
    );

    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Duration: {:.1}s", elapsed.as_secs_f64());
    println!("  Listing pages processed: {}", stats.pages_processed);
    println!("  Companies found: {}", stats.companies_found);
    println!("  Emails extracted: {}", stats.emails_extracted);
    println!("  Errors: {}", stats.errors);
    println!();

    println!("Export ({} records):", export.total);
    for (label, count) in [
        ("With email", export.with_email),
        ("With website", export.with_website),
        ("With phone", export.with_phone),
    ] {
        println!(
            "  {}: {} ({:.1}%)",
            label,
            count,
            export.percentage(count)
        );
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} companies with email)",
        rate, stats.emails_extracted, stats.companies_found
    );
}
