use crate::translate::{Record, RecordTranslator, Translation};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of one merge pass. Malformed lines are kept out of the sorted
/// record stream and surfaced separately as a diagnostic stream.
#[derive(Debug, Default)]
pub struct MergeOutput {
    pub records: Vec<Record>,
    pub malformed: Vec<String>,
}

/// Read every file, translate every line and return the records sorted
/// ascending by timestamp.
///
/// The sort is stable: records with equal timestamps keep their encounter
/// order (file enumeration order, then line order within a file), so
/// same-second requests are never reordered across runs.
///
/// All lines are held in memory for the duration of the pass; per-run file
/// counts are bounded by the configured lookback window, so no streaming
/// k-way merge is attempted.
pub fn merge(paths: &[PathBuf], translator: &RecordTranslator) -> Result<MergeOutput, MergeError> {
    let mut output = MergeOutput::default();

    for path in paths {
        read_file(path, translator, &mut output)?;
    }

    output.records.sort_by_key(|record| record.timestamp);
    Ok(output)
}

fn read_file(
    path: &Path,
    translator: &RecordTranslator,
    output: &mut MergeOutput,
) -> Result<(), MergeError> {
    let file = File::open(path).map_err(|e| MergeError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| MergeError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        if line.is_empty() {
            continue;
        }
        match translator.translate(&line) {
            Translation::Translated(record) => output.records.push(record),
            Translation::Malformed(original) => output.malformed.push(original),
        }
    }

    Ok(())
}
