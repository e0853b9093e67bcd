use crate::template;
use crate::translate::Record;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to open output file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Routes sorted records into one output file per calendar day.
///
/// All destinations for the active range are opened eagerly before any
/// record is written, and every opened handle is flushed on all exit paths:
/// explicitly through `close_file_descriptors`, or as a last resort when the
/// router is dropped.
///
/// Destinations are keyed by the record's UTC calendar date; a record whose
/// date has no open destination is counted and skipped, never an error.
pub struct OutputRouter {
    template: String,
    bucket: String,
    files: BTreeMap<NaiveDate, BufWriter<File>>,
    dropped: u64,
}

impl OutputRouter {
    pub fn new(template: &str, bucket: &str) -> Self {
        Self {
            template: template.to_string(),
            bucket: bucket.to_string(),
            files: BTreeMap::new(),
            dropped: 0,
        }
    }

    fn destination_path(&self, date: NaiveDate) -> PathBuf {
        PathBuf::from(template::render_day(&self.template, &self.bucket, date))
    }

    /// Create every parent directory a destination in `dates` will need.
    /// Already-existing directories are not an error.
    pub fn ensure_output_directories(&self, dates: &[NaiveDate]) -> Result<(), OutputError> {
        for date in dates {
            if let Some(parent) = self.destination_path(*date).parent() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Open one writable destination per date, truncating previous contents
    /// so re-runs are idempotent by destination path.
    pub fn open_file_descriptors(&mut self, dates: &[NaiveDate]) -> Result<(), OutputError> {
        for date in dates {
            let path = self.destination_path(*date);
            let file = File::create(&path).map_err(|e| OutputError::Open {
                path: path.clone(),
                source: e,
            })?;
            debug!(date = %date, path = %path.display(), "Opened destination");
            self.files.insert(*date, BufWriter::new(file));
        }
        Ok(())
    }

    /// Dispatch each record to the destination matching its date. Records
    /// dated outside the opened set are skipped and counted; the caller
    /// decides whether that is worth reporting.
    pub fn write(&mut self, records: &[Record]) -> Result<(), OutputError> {
        for record in records {
            let date = record.timestamp.date_naive();
            match self.files.get_mut(&date) {
                Some(writer) => writeln!(writer, "{}", record.text)?,
                None => self.dropped += 1,
            }
        }
        Ok(())
    }

    /// Number of records skipped because their date had no open destination.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Flush and close every opened destination. Returns the first flush
    /// error encountered but still closes the remaining handles.
    pub fn close_file_descriptors(&mut self) -> Result<(), OutputError> {
        let mut result = Ok(());
        for (_, mut writer) in std::mem::take(&mut self.files) {
            if let Err(e) = writer.flush() {
                if result.is_ok() {
                    result = Err(OutputError::Io(e));
                }
            }
        }
        result
    }
}

impl Drop for OutputRouter {
    fn drop(&mut self) {
        // Best effort: never leave buffered records behind on an error path.
        for writer in self.files.values_mut() {
            let _ = writer.flush();
        }
    }
}
