use crate::cache::{CacheError, ObjectCache};
use crate::combine::{combine_month, CombineError};
use crate::config::parse::{validate_config, ConfigError};
use crate::config::{load_config, Config};
use crate::merge::{merge, MergeError};
use crate::output::{OutputError, OutputRouter};
use crate::range::{date_range, RangeError};
use crate::rlimit::{ensure_descriptor_budget, ProcessRlimit};
use crate::store::{FsStore, ObjectStore, StoreError};
use crate::template;
use crate::translate::RecordTranslator;
use chrono::{Datelike, Local, NaiveDate};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid date range: {0}")]
    Range(#[from] RangeError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("combine error: {0}")]
    Combine(#[from] CombineError),

    #[error("{0} bucket(s) failed")]
    BucketsFailed(usize),
}

/// Command-line settings layered on top of the config file.
#[derive(Debug, Default)]
pub struct RunOverrides {
    pub buckets: Vec<String>,
    pub days_to_look_back: Option<i64>,
    pub days_to_ignore: Option<i64>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub buckets_processed: usize,
    pub records_written: usize,
    pub malformed_lines: usize,
    pub records_dropped: u64,
}

pub fn run(
    config_path: Option<PathBuf>,
    overrides: RunOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = match config_path {
        Some(path) => path,
        None => {
            eprintln!("Error: config not found");
            eprintln!("Searched locations:");
            eprintln!("  ~/.config/bucketlog/config.yml");
            eprintln!("  /etc/bucketlog/config.yml");
            eprintln!("\nUse --config <path> to specify a config file, or run 'bucketlog config init' to generate one.");
            std::process::exit(1);
        }
    };

    info!(config_path = %config_path.display(), "Loading configuration");
    let mut config = load_config(&config_path)?;
    apply_overrides(&mut config, overrides)?;

    let today = Local::now().date_naive();
    run_pipeline(&config, today)?;
    Ok(())
}

fn apply_overrides(config: &mut Config, overrides: RunOverrides) -> Result<(), ConfigError> {
    if !overrides.buckets.is_empty() {
        config.buckets = overrides.buckets;
    }
    if let Some(look_back) = overrides.days_to_look_back {
        config.days_to_look_back = look_back;
    }
    if let Some(ignore) = overrides.days_to_ignore {
        config.days_to_ignore = ignore;
    }
    // Overrides can invalidate a config that was fine on disk.
    validate_config(config)
}

/// Run the whole batch for every configured bucket.
///
/// A failing bucket is logged and skipped; destinations already written for
/// other buckets are left intact, and the run as a whole reports failure.
pub fn run_pipeline(config: &Config, today: NaiveDate) -> Result<RunSummary, RunError> {
    let dates = date_range(config.days_to_look_back, config.days_to_ignore, today)?;
    info!(
        start = %dates[0],
        end = %dates[dates.len() - 1],
        days = dates.len(),
        "Processing range"
    );

    let store = FsStore::new(config.store.root.clone());
    let buckets = if config.buckets.is_empty() {
        store.list_buckets()?
    } else {
        config.buckets.clone()
    };

    let translator = RecordTranslator::new();
    let mut summary = RunSummary::default();
    let mut failed = 0;

    for bucket in &buckets {
        match process_bucket(&store, config, &translator, bucket, &dates) {
            Ok(bucket_summary) => {
                info!(
                    bucket = %bucket,
                    files = bucket_summary.files,
                    records = bucket_summary.records,
                    "Bucket complete"
                );
                summary.buckets_processed += 1;
                summary.records_written += bucket_summary.records;
                summary.malformed_lines += bucket_summary.malformed;
                summary.records_dropped += bucket_summary.dropped;
            }
            Err(e) => {
                error!(bucket = %bucket, error = %e, "Bucket failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(RunError::BucketsFailed(failed));
    }
    Ok(summary)
}

struct BucketSummary {
    files: usize,
    records: usize,
    malformed: usize,
    dropped: u64,
}

fn process_bucket(
    store: &dyn ObjectStore,
    config: &Config,
    translator: &RecordTranslator,
    bucket: &str,
    dates: &[NaiveDate],
) -> Result<BucketSummary, RunError> {
    // Logs may be delivered to a different target bucket and prefix.
    let (source_bucket, key_prefix) = match store.logging_target(bucket)? {
        Some(target) => (target.target_bucket, target.target_prefix),
        None => (bucket.to_string(), config.log_prefix.clone()),
    };

    let cache_root = Path::new(&template::render_bucket(&config.cache_dir, bucket)).to_path_buf();
    let cache = ObjectCache::new(store, cache_root, &key_prefix)?;

    let mut files = Vec::new();
    for date in dates {
        let date_prefix = format!("{}{}", key_prefix, date.format("%Y-%m-%d"));
        for key in store.list_objects(&source_bucket, &date_prefix)? {
            files.push(cache.ensure_local(&source_bucket, &key)?);
        }
    }
    info!(bucket = %bucket, files = files.len(), "Log objects cached");

    // Inputs are read sequentially, but the router holds one handle per day.
    ensure_descriptor_budget(files.len() + dates.len(), &ProcessRlimit);

    let merged = merge(&files, translator)?;
    for line in &merged.malformed {
        eprintln!("# ERROR: {}", line);
    }
    if !merged.malformed.is_empty() {
        warn!(
            bucket = %bucket,
            count = merged.malformed.len(),
            "Malformed log lines were skipped"
        );
    }

    let mut router = OutputRouter::new(&config.output_file, bucket);
    router.ensure_output_directories(dates)?;
    router.open_file_descriptors(dates)?;
    let write_result = router.write(&merged.records);
    let close_result = router.close_file_descriptors();
    write_result?;
    close_result?;

    if router.dropped() > 0 {
        warn!(
            bucket = %bucket,
            dropped = router.dropped(),
            "Records dated outside the active range were skipped"
        );
    }

    if let Some(month_template) = &config.combined_file {
        let mut months: Vec<(i32, u32)> = dates.iter().map(|d| (d.year(), d.month())).collect();
        months.dedup();
        for (year, month) in months {
            let combined = combine_month(&config.output_file, month_template, bucket, year, month)?;
            info!(
                bucket = %bucket,
                path = %combined.path.display(),
                days = combined.days_combined,
                "Combined month file written"
            );
        }
    }

    Ok(BucketSummary {
        files: files.len(),
        records: merged.records.len() - router.dropped() as usize,
        malformed: merged.malformed.len(),
        dropped: router.dropped(),
    })
}
