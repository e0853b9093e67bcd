pub mod fs;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use fs::FsStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("invalid logging target for bucket '{bucket}': {reason}")]
    InvalidLoggingTarget { bucket: String, reason: String },

    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where a bucket's access logs are delivered: a (possibly different)
/// target bucket and a key prefix within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingTarget {
    pub target_bucket: String,
    pub target_prefix: String,
}

/// The object-store collaborator. The pipeline only consumes listing and
/// byte-fetch; credentials and connection management live behind the
/// implementation.
pub trait ObjectStore {
    /// All bucket names visible through this store, in sorted order.
    fn list_buckets(&self) -> Result<Vec<String>, StoreError>;

    /// The logging target configured for `bucket`, if any.
    fn logging_target(&self, bucket: &str) -> Result<Option<LoggingTarget>, StoreError>;

    /// All object keys in `bucket` starting with `prefix`, in sorted order.
    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// The full contents of one object.
    fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;
}
