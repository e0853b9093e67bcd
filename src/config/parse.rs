use super::types::Config;
use crate::config::{expand_tilde, expand_tilde_str};
use crate::range;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml = fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        )
    })?;

    let mut config: Config = serde_yaml::from_str(&yaml)?;
    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.store.root = expand_tilde(&config.store.root);
    config.cache_dir = expand_tilde_str(&config.cache_dir);
    config.output_file = expand_tilde_str(&config.output_file);
    if let Some(combined) = config.combined_file.take() {
        config.combined_file = Some(expand_tilde_str(&combined));
    }
}

/// Check everything that can be checked before any I/O happens. Collects
/// every problem instead of stopping at the first.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Err(e) = range::date_range(
        config.days_to_look_back,
        config.days_to_ignore,
        chrono::Utc::now().date_naive(),
    ) {
        errors.push(e.to_string());
    }

    if !config.store.root.exists() {
        errors.push(format!(
            "store root does not exist: {}",
            config.store.root.display()
        ));
    }

    if config.cache_dir.is_empty() {
        errors.push("cache_dir must not be empty".to_string());
    }

    if config.output_file.is_empty() {
        errors.push("output_file must not be empty".to_string());
    } else if !config.output_file.contains(":day") {
        errors.push("output_file must contain the ':day' placeholder".to_string());
    }

    if let Some(combined) = &config.combined_file {
        if combined.contains(":day") {
            errors.push("combined_file must not contain the ':day' placeholder".to_string());
        }
    }

    // Processing several buckets through one template requires :bucket so
    // outputs cannot collide.
    let several_buckets = config.buckets.len() != 1;
    if several_buckets {
        for (name, template) in [
            ("output_file", Some(config.output_file.as_str())),
            ("cache_dir", Some(config.cache_dir.as_str())),
            ("combined_file", config.combined_file.as_deref()),
        ] {
            if let Some(template) = template {
                if !template.contains(":bucket") {
                    errors.push(format!(
                        "{} must contain ':bucket' when processing more than one bucket",
                        name
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", yaml).unwrap();
        file.flush().unwrap();
        file
    }

    fn valid_yaml(store_root: &Path) -> String {
        format!(
            "store:\n  root: {root}\nbuckets:\n  - logbucket\nlog_prefix: logs/\ncache_dir: /tmp/cache/:bucket\noutput_file: /tmp/logs/:bucket/:year/:month/:day.log\ncombined_file: /tmp/logs/:bucket/:year/:month.log\ndays_to_look_back: 5\ndays_to_ignore: 2\n",
            root = store_root.display()
        )
    }

    #[test]
    fn test_load_valid_config() {
        let store = TempDir::new().unwrap();
        let file = write_config(&valid_yaml(store.path()));

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.buckets, vec!["logbucket"]);
        assert_eq!(config.log_prefix, "logs/");
        assert_eq!(config.days_to_look_back, 5);
        assert_eq!(config.days_to_ignore, 2);
        assert!(config.combined_file.is_some());
    }

    #[test]
    fn test_days_to_ignore_defaults_to_zero() {
        let store = TempDir::new().unwrap();
        let yaml = format!(
            "store:\n  root: {root}\nbuckets: [b]\nlog_prefix: logs/\ncache_dir: /tmp/cache\noutput_file: /tmp/logs/:year/:month/:day.log\ndays_to_look_back: 3\n",
            root = store.path().display()
        );
        let file = write_config(&yaml);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.days_to_ignore, 0);
    }

    #[test]
    fn test_invalid_range_rejected() {
        let store = TempDir::new().unwrap();
        let yaml = valid_yaml(store.path()).replace("days_to_ignore: 2", "days_to_ignore: 5");
        let file = write_config(&yaml);

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("days_to_ignore")));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_store_root_rejected() {
        let yaml = valid_yaml(Path::new("/definitely/not/here"));
        let file = write_config(&yaml);

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("store root")));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_output_file_requires_day_placeholder() {
        let store = TempDir::new().unwrap();
        let yaml = valid_yaml(store.path()).replace(
            "output_file: /tmp/logs/:bucket/:year/:month/:day.log",
            "output_file: /tmp/logs/:bucket/all.log",
        );
        let file = write_config(&yaml);

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains(":day")));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_multiple_buckets_require_bucket_placeholder() {
        let store = TempDir::new().unwrap();
        let yaml = format!(
            "store:\n  root: {root}\nbuckets: [one, two]\nlog_prefix: logs/\ncache_dir: /tmp/cache\noutput_file: /tmp/logs/:year/:month/:day.log\ndays_to_look_back: 3\n",
            root = store.path().display()
        );
        let file = write_config(&yaml);

        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains(":bucket")));
            }
            other => panic!("expected validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_single_bucket_without_placeholder_allowed() {
        let store = TempDir::new().unwrap();
        let yaml = format!(
            "store:\n  root: {root}\nbuckets: [only]\nlog_prefix: logs/\ncache_dir: /tmp/cache\noutput_file: /tmp/logs/:year/:month/:day.log\ndays_to_look_back: 3\n",
            root = store.path().display()
        );
        let file = write_config(&yaml);
        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let file = write_config("store: [not, a, mapping");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::YamlParse(_))
        ));
    }
}
