//! Harness configuration
//!
//! Resolved from, in increasing priority: built-in defaults, an optional
//! YAML file, and the `EMBEDCHECK_CALIBRATION_DIR` environment variable.
//!
//! ```yaml
//! calibration_dir: /var/lib/embedcheck/calibration
//! accept_prob: 1.0e-4
//! batch_size: 10000
//! ```

use crate::calibration::{
    CalibrationResult, CalibrationStore, Calibrator, DirectoryStore, OpenStore,
    DEFAULT_BATCH_SIZE,
};
use crate::oracle::{SequentialOracle, DEFAULT_ACCEPT_PROB};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the calibration directory
pub const CALIBRATION_DIR_ENV: &str = "EMBEDCHECK_CALIBRATION_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default calibration directory (~/.local/share/embedcheck/calibration)
pub fn default_calibration_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("embedcheck").join("calibration")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub calibration_dir: PathBuf,
    /// Bound on the false-negative probability per scenario
    pub accept_prob: f64,
    /// Calibration trials per unit of scenario multiplier
    pub batch_size: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            calibration_dir: default_calibration_dir(),
            accept_prob: DEFAULT_ACCEPT_PROB,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl HarnessConfig {
    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Defaults or `path`, then the environment
    pub fn resolve(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_override(std::env::var_os(CALIBRATION_DIR_ENV)))
    }

    /// Apply a value read from [`CALIBRATION_DIR_ENV`]; empty values are ignored
    pub fn with_env_override(mut self, calibration_dir: Option<OsString>) -> Self {
        if let Some(dir) = calibration_dir.filter(|d| !d.is_empty()) {
            self.calibration_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn with_calibration_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.calibration_dir = dir.into();
        self
    }

    pub fn with_accept_prob(mut self, accept_prob: f64) -> Self {
        self.accept_prob = accept_prob;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(self) -> ConfigResult<Self> {
        if !(self.accept_prob > 0.0 && self.accept_prob < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "accept_prob must lie strictly between 0 and 1, got {}",
                self.accept_prob
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive".to_string()));
        }
        Ok(self)
    }

    pub fn open_directory_store(&self) -> CalibrationResult<DirectoryStore> {
        DirectoryStore::open(&self.calibration_dir)
    }

    pub fn oracle<'a>(&self, store: &'a dyn CalibrationStore) -> SequentialOracle<'a> {
        SequentialOracle::new(store).with_accept_prob(self.accept_prob)
    }

    pub fn calibrator<'a>(&self, store: &'a dyn CalibrationStore) -> Calibrator<'a> {
        Calibrator::new(store).with_batch_size(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::MemoryStore;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.accept_prob, 1e-4);
        assert_eq!(config.batch_size, 10_000);
        assert!(config.calibration_dir.ends_with("embedcheck/calibration"));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = HarnessConfig::from_yaml("batch_size: 250\n").unwrap();
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.accept_prob, DEFAULT_ACCEPT_PROB);
    }

    #[test]
    fn full_yaml() {
        let config = HarnessConfig::from_yaml(
            "calibration_dir: /tmp/cal\naccept_prob: 0.001\nbatch_size: 7\n",
        )
        .unwrap();
        assert_eq!(config.calibration_dir, PathBuf::from("/tmp/cal"));
        assert_eq!(config.accept_prob, 0.001);
        assert_eq!(config.batch_size, 7);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            HarnessConfig::from_yaml("batchsize: 3\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            HarnessConfig::from_yaml("accept_prob: 1.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            HarnessConfig::from_yaml("batch_size: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn env_override_replaces_directory() {
        let config = HarnessConfig::default().with_env_override(Some("/srv/cal".into()));
        assert_eq!(config.calibration_dir, PathBuf::from("/srv/cal"));

        let untouched = HarnessConfig::default().with_calibration_dir("/a");
        assert_eq!(
            untouched.clone().with_env_override(Some(OsString::new())),
            untouched
        );
        assert_eq!(untouched.clone().with_env_override(None), untouched);
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "accept_prob: 0.01").unwrap();
        let config = HarnessConfig::load(file.path()).unwrap();
        assert_eq!(config.accept_prob, 0.01);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = HarnessConfig::load("/nonexistent/embedcheck.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/embedcheck.yaml"));
    }

    #[test]
    fn builds_oracle_and_calibrator() {
        let store = MemoryStore::new();
        let config = HarnessConfig::default()
            .with_accept_prob(0.05)
            .with_batch_size(3);
        assert_eq!(config.oracle(&store).accept_prob(), 0.05);
        assert_eq!(config.calibrator(&store).batch_size(), 3);
    }

    #[test]
    fn opens_directory_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::default().with_calibration_dir(dir.path().join("cal"));
        let store = config.open_directory_store().unwrap();
        assert_eq!(store.root(), dir.path().join("cal"));
    }
}
