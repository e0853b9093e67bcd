use crate::config::load_config;
use crate::store::{FsStore, ObjectStore};
use std::path::PathBuf;

/// List buckets with their logging target, one per line:
/// `name [target_bucket/target_prefix]` or `name [-]` when logging is not
/// configured.
pub fn list(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path.ok_or("config not found; use --config <path>")?;
    let config = load_config(&config_path)?;

    let store = FsStore::new(config.store.root.clone());
    let buckets = if config.buckets.is_empty() {
        store.list_buckets()?
    } else {
        config.buckets.clone()
    };

    for bucket in buckets {
        match store.logging_target(&bucket)? {
            Some(target) => println!(
                "{} [{}/{}]",
                bucket, target.target_bucket, target.target_prefix
            ),
            None => println!("{} [-]", bucket),
        }
    }

    Ok(())
}
