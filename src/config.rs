//! Layered configuration: built-in defaults, then an optional YAML file,
//! then `SUBTRACK_*` environment variables (`__` separates nested keys).

use crate::types::{Result, SubtrackError};
use config::{Config as ConfigBuilder, Environment, File};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SUBTRACK";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Defaults to `~/.subtrack`
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListConfig {
    pub default_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig { data_dir: None },
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
            list: ListConfig { default_limit: 20 },
        }
    }
}

impl Config {
    /// Load from `~/.subtrack/config.yaml` if it exists
    pub fn load() -> Result<Self> {
        let path = home_dir()?.join(".subtrack").join("config.yaml");
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Directory holding `subscriptions.json`
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join(".subtrack")),
        }
    }
}

fn home_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| SubtrackError::Config("Cannot determine home directory".into()))?;
    Ok(base_dirs.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file() -> NamedTempFile {
        tempfile::Builder::new().suffix(".yaml").tempfile().unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.list.default_limit, 20);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load_from_file("/nonexistent/subtrack/config.yaml").unwrap();
        assert_eq!(config.list.default_limit, 20);
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = yaml_file();
        writeln!(
            file,
            "storage:\n  data_dir: /tmp/subtrack-data\nlogging:\n  level: debug\nlist:\n  default_limit: 5"
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/tmp/subtrack-data"))
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.list.default_limit, 5);
        assert_eq!(
            config.data_dir().unwrap(),
            PathBuf::from("/tmp/subtrack-data")
        );
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let mut file = yaml_file();
        writeln!(file, "logging:\n  level: info").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.list.default_limit, 20);
        assert!(config.storage.data_dir.is_none());
    }
}
