use crate::store::{ObjectStore, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache directory does not exist: {0}")]
    DirectoryMissing(PathBuf),

    #[error("failed to download {bucket}/{key}: {source}")]
    DownloadFailed {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("cache i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Local cache of remote log objects, keyed by object name.
///
/// Presence of the local file is the sole cache-hit signal; no remote
/// metadata is compared. Entries are written once and never updated or
/// deleted by the pipeline.
pub struct ObjectCache<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    root: PathBuf,
    key_prefix: String,
}

impl<'a, S: ObjectStore + ?Sized> ObjectCache<'a, S> {
    /// Create a cache rooted at `root`. The root itself must already exist;
    /// only per-object parent directories are created on demand.
    pub fn new(
        store: &'a S,
        root: impl Into<PathBuf>,
        key_prefix: &str,
    ) -> Result<Self, CacheError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CacheError::DirectoryMissing(root));
        }
        Ok(Self {
            store,
            root,
            key_prefix: key_prefix.to_string(),
        })
    }

    /// The local path an object key maps to: the configured prefix stripped
    /// from the key, joined under the cache root.
    pub fn local_path(&self, key: &str) -> PathBuf {
        let relative = key.strip_prefix(&self.key_prefix).unwrap_or(key);
        self.root.join(relative)
    }

    /// Make sure a local copy of `key` exists and return its path.
    ///
    /// Idempotent: when the local file already exists the store is not
    /// touched. A fresh copy is written to a temporary name and renamed into
    /// place, so a failed download never masquerades as a cache hit.
    pub fn ensure_local(&self, bucket: &str, key: &str) -> Result<PathBuf, CacheError> {
        let local = self.local_path(key);
        if local.exists() {
            debug!(key = %key, path = %local.display(), "Cache hit");
            return Ok(local);
        }

        let bytes = self
            .store
            .fetch_object(bucket, key)
            .map_err(|e| CacheError::DownloadFailed {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: e,
            })?;

        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent)?;
        }

        let partial = partial_path(&local);
        if let Err(e) = fs::write(&partial, &bytes) {
            let _ = fs::remove_file(&partial);
            return Err(CacheError::Io(e));
        }
        fs::rename(&partial, &local)?;

        debug!(key = %key, bytes = bytes.len(), path = %local.display(), "Cached object");
        Ok(local)
    }
}

fn partial_path(local: &Path) -> PathBuf {
    let mut name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".part");
    local.with_file_name(name)
}
