use super::{LoggingTarget, ObjectStore, StoreError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the optional per-bucket marker file declaring a logging target.
const LOGGING_TARGET_FILE: &str = ".logging.yml";

/// Suffix of in-progress downloads; never listed as objects.
const PARTIAL_SUFFIX: &str = ".part";

/// Filesystem-backed object store. Buckets are top-level directories under
/// the root; object keys are slash-separated paths below a bucket directory.
///
/// A bucket may carry a `.logging.yml` file with `target_bucket` and
/// `target_prefix` keys to declare where its access logs are delivered.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        let dir = self.root.join(bucket);
        if !dir.is_dir() {
            return Err(StoreError::BucketNotFound(bucket.to_string()));
        }
        Ok(dir)
    }
}

impl ObjectStore for FsStore {
    fn list_buckets(&self) -> Result<Vec<String>, StoreError> {
        let mut buckets = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                buckets.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        buckets.sort();
        Ok(buckets)
    }

    fn logging_target(&self, bucket: &str) -> Result<Option<LoggingTarget>, StoreError> {
        let path = self.bucket_dir(bucket)?.join(LOGGING_TARGET_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let target: LoggingTarget =
            serde_yaml::from_str(&contents).map_err(|e| StoreError::InvalidLoggingTarget {
                bucket: bucket.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(target))
    }

    fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, StoreError> {
        let dir = self.bucket_dir(bucket)?;
        let mut keys = Vec::new();
        collect_keys(&dir, &dir, &mut keys)?;
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }

    fn fetch_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.bucket_dir(bucket)?.join(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

fn collect_keys(dir: &Path, base: &Path, keys: &mut Vec<String>) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_keys(&path, base, keys)?;
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == LOGGING_TARGET_FILE || name.ends_with(PARTIAL_SUFFIX) {
            continue;
        }
        let relative = path
            .strip_prefix(base)
            .expect("entry path is always below the walk base");
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        keys.push(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_objects(objects: &[(&str, &str, &str)]) -> (TempDir, FsStore) {
        let tmp = TempDir::new().unwrap();
        for (bucket, key, data) in objects {
            let path = tmp.path().join(bucket).join(key);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, data).unwrap();
        }
        let store = FsStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn test_list_buckets_sorted() {
        let (_tmp, store) = store_with_objects(&[
            ("zulu", "a", "1"),
            ("alpha", "a", "1"),
            ("mike", "a", "1"),
        ]);
        assert_eq!(store.list_buckets().unwrap(), vec!["alpha", "mike", "zulu"]);
    }

    #[test]
    fn test_list_objects_filters_by_prefix_and_sorts() {
        let (_tmp, store) = store_with_objects(&[
            ("b", "logs/2013-02-12-00-23-05-CVJCT", "x"),
            ("b", "logs/2013-02-11-00-05-23-UYVJC", "x"),
            ("b", "logs/2013-02-13-05-00-23-FGTCC", "x"),
            ("b", "other/2013-02-11-ignored", "x"),
        ]);
        assert_eq!(
            store.list_objects("b", "logs/2013-02-1").unwrap(),
            vec![
                "logs/2013-02-11-00-05-23-UYVJC",
                "logs/2013-02-12-00-23-05-CVJCT",
                "logs/2013-02-13-05-00-23-FGTCC",
            ]
        );
        assert_eq!(
            store.list_objects("b", "logs/2013-02-12").unwrap(),
            vec!["logs/2013-02-12-00-23-05-CVJCT"]
        );
    }

    #[test]
    fn test_fetch_object_round_trip() {
        let (_tmp, store) = store_with_objects(&[("b", "logs/key1", "AWS LOGLINE")]);
        assert_eq!(store.fetch_object("b", "logs/key1").unwrap(), b"AWS LOGLINE");
    }

    #[test]
    fn test_fetch_missing_object() {
        let (_tmp, store) = store_with_objects(&[("b", "logs/key1", "x")]);
        assert!(matches!(
            store.fetch_object("b", "logs/nope"),
            Err(StoreError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_bucket() {
        let (_tmp, store) = store_with_objects(&[("b", "logs/key1", "x")]);
        assert!(matches!(
            store.list_objects("nope", ""),
            Err(StoreError::BucketNotFound(_))
        ));
    }

    #[test]
    fn test_logging_target_parsed() {
        let (tmp, store) = store_with_objects(&[("website", "index.html", "hi")]);
        fs::write(
            tmp.path().join("website").join(LOGGING_TARGET_FILE),
            "target_bucket: logbucket\ntarget_prefix: logs/website/\n",
        )
        .unwrap();

        let target = store.logging_target("website").unwrap().unwrap();
        assert_eq!(target.target_bucket, "logbucket");
        assert_eq!(target.target_prefix, "logs/website/");
    }

    #[test]
    fn test_logging_target_absent() {
        let (_tmp, store) = store_with_objects(&[("b", "k", "x")]);
        assert!(store.logging_target("b").unwrap().is_none());
    }

    #[test]
    fn test_logging_target_file_not_listed_as_object() {
        let (tmp, store) = store_with_objects(&[("b", "logs/key1", "x")]);
        fs::write(
            tmp.path().join("b").join(LOGGING_TARGET_FILE),
            "target_bucket: b\ntarget_prefix: logs/\n",
        )
        .unwrap();
        assert_eq!(store.list_objects("b", "").unwrap(), vec!["logs/key1"]);
    }
}
