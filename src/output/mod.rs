//! Output module for crawled records
//!
//! This module handles:
//! - Mapping records to CSV rows
//! - First-seen-wins de-duplication
//! - Writing the per-run CSV file
//! - Printing run statistics

mod csv_sink;
mod dedup;
mod record;
pub mod stats;

pub use csv_sink::{validate_csv, CsvSink, RecordSink, SinkError, CAPTURED_AT_FORMAT};
pub use dedup::{dedup, duplicate_key, normalize_key_part};
pub use record::{CompanyRecord, CSV_HEADER};
pub use stats::{print_statistics, success_rate, ExportStats};
