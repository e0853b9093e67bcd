use crate::template;
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("failed to create combined file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug)]
pub struct CombineSummary {
    pub path: PathBuf,
    pub days_combined: usize,
}

/// Concatenate a month of per-day output files into one combined file.
///
/// Day files are visited in ascending numeric day order (1 through 31, via
/// the day-file template), so "10" can never sort before "2". Days without a
/// file are skipped; no zero-filling. The combined file is opened for
/// writing before any day file is read.
pub fn combine_month(
    day_template: &str,
    month_template: &str,
    bucket: &str,
    year: i32,
    month: u32,
) -> Result<CombineSummary, CombineError> {
    let path = PathBuf::from(template::render_month(month_template, bucket, year, month));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CombineError::Create {
            path: path.clone(),
            source: e,
        })?;
    }
    let mut combined = File::create(&path).map_err(|e| CombineError::Create {
        path: path.clone(),
        source: e,
    })?;

    let mut days_combined = 0;
    for day in 1..=31 {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        let day_path = PathBuf::from(template::render_day(day_template, bucket, date));
        let mut day_file = match File::open(&day_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(CombineError::Append {
                    path: day_path,
                    source: e,
                })
            }
        };
        io::copy(&mut day_file, &mut combined).map_err(|e| CombineError::Append {
            path: day_path.clone(),
            source: e,
        })?;
        debug!(day = day, path = %day_path.display(), "Appended day file");
        days_combined += 1;
    }

    Ok(CombineSummary {
        path,
        days_combined,
    })
}
