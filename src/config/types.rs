use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,

    /// Buckets to process. Empty means every bucket the store lists.
    #[serde(default)]
    pub buckets: Vec<String>,

    /// Remote key prefix under which log objects are delivered, e.g. "logs/".
    /// Stripped from keys when deriving cache paths, joined with the date
    /// when listing a day's objects.
    pub log_prefix: String,

    /// Cache-root template. Must contain `:bucket` when more than one bucket
    /// is processed. The rendered directory must already exist.
    pub cache_dir: String,

    /// Per-day output file template,
    /// e.g. "./logs/:bucket/:year/:month/:day.log".
    pub output_file: String,

    /// Optional per-month combined file template. When set, every month
    /// touched by the range is combined after routing.
    #[serde(default)]
    pub combined_file: Option<String>,

    pub days_to_look_back: i64,

    #[serde(default)]
    pub days_to_ignore: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the filesystem-backed object store.
    pub root: PathBuf,
}
