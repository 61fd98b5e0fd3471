//! CSV record sink
//!
//! One file per run. Rows are appended while the crawl runs and the whole file
//! is rewritten once emails have been resolved.

use crate::config::OutputConfig;
use crate::output::dedup::duplicate_key;
use crate::output::record::{CompanyRecord, CSV_HEADER};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Format of the `CapturedAt` column
pub const CAPTURED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format substituted for `{timestamp}` in the file name
const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Errors raised while writing or checking the output file
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected header in {path}: {found:?}")]
    Header { path: String, found: Vec<String> },
}

/// Durable destination for crawled records
pub trait RecordSink {
    /// Creates the run's output and writes the records not seen before
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Location of the output, reused for later calls
    /// * `Err(SinkError)` - The output could not be created
    fn append(&mut self, records: &[CompanyRecord]) -> Result<PathBuf, SinkError>;

    /// Appends the records not seen before to an existing output
    fn flush_append(
        &mut self,
        records: &[CompanyRecord],
        location: &Path,
    ) -> Result<(), SinkError>;

    /// Replaces the output with the final, deduplicated record set
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rows written
    /// * `Err(SinkError)` - The output could not be rewritten
    fn finalize(&mut self, records: &[CompanyRecord], location: &Path)
        -> Result<usize, SinkError>;
}

/// Writes records to `<directory>/<filename>` with a fixed header
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    source: String,
    /// Duplicate keys already written, with their capture time
    written: HashMap<String, String>,
}

impl CsvSink {
    /// Creates a sink for a run started at `started`
    ///
    /// `{timestamp}` in the file name is replaced with the start time.
    pub fn new(
        directory: impl Into<PathBuf>,
        filename: &str,
        source: impl Into<String>,
        started: DateTime<Local>,
    ) -> Self {
        let name = filename.replace(
            "{timestamp}",
            &started.format(FILENAME_TIMESTAMP_FORMAT).to_string(),
        );
        Self {
            path: directory.into().join(name),
            source: source.into(),
            written: HashMap::new(),
        }
    }

    /// Creates a sink from the output section, stamped with the current time
    pub fn from_config(config: &OutputConfig, source: impl Into<String>) -> Self {
        Self::new(&config.directory, &config.filename, source, Local::now())
    }

    /// Path the run's rows are written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct records written so far
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    fn now() -> String {
        Local::now().format(CAPTURED_AT_FORMAT).to_string()
    }

    /// Writes every record whose key is new; returns how many were written
    fn write_new<W: std::io::Write>(
        &mut self,
        writer: &mut csv::Writer<W>,
        records: &[CompanyRecord],
    ) -> Result<usize, SinkError> {
        let mut count = 0;
        for record in records {
            let key = duplicate_key(record);
            if self.written.contains_key(&key) {
                tracing::debug!("Skipping duplicate row: {}", record.label());
                continue;
            }
            let captured_at = Self::now();
            writer.write_record(record.to_row(&self.source, &captured_at))?;
            self.written.insert(key, captured_at);
            count += 1;
        }
        Ok(count)
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, records: &[CompanyRecord]) -> Result<PathBuf, SinkError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let exists = self.path.exists() && fs::metadata(&self.path)?.len() > 0;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !exists {
            writer.write_record(CSV_HEADER)?;
        }
        let count = self.write_new(&mut writer, records)?;
        writer.flush()?;

        tracing::debug!("Appended {} row(s) to {}", count, self.path.display());
        Ok(self.path.clone())
    }

    fn flush_append(
        &mut self,
        records: &[CompanyRecord],
        location: &Path,
    ) -> Result<(), SinkError> {
        if location != self.path {
            tracing::warn!(
                "Flush target {} differs from run file {}; using the run file",
                location.display(),
                self.path.display()
            );
        }
        self.append(records).map(|_| ())
    }

    fn finalize(
        &mut self,
        records: &[CompanyRecord],
        location: &Path,
    ) -> Result<usize, SinkError> {
        if let Some(parent) = location.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = location.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut captured: HashMap<String, String> = HashMap::new();
        let mut writer = csv::Writer::from_path(&tmp)?;
        writer.write_record(CSV_HEADER)?;
        for record in records {
            let key = duplicate_key(record);
            if captured.contains_key(&key) {
                continue;
            }
            let captured_at = self
                .written
                .get(&key)
                .cloned()
                .unwrap_or_else(Self::now);
            writer.write_record(record.to_row(&self.source, &captured_at))?;
            captured.insert(key, captured_at);
        }
        writer.flush()?;
        drop(writer);

        fs::rename(&tmp, location)?;

        let rows = captured.len();
        self.written = captured;
        tracing::info!("Wrote {} record(s) to {}", rows, location.display());
        Ok(rows)
    }
}

/// Checks the header of a written file and counts its data rows
pub fn validate_csv(path: &Path) -> Result<usize, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header != CSV_HEADER {
        return Err(SinkError::Header {
            path: path.display().to_string(),
            found: header,
        });
    }

    let mut rows = 0;
    for row in reader.records() {
        row?;
        rows += 1;
    }
    Ok(rows)
}
