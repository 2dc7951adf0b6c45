//! Calibration store trait definitions

use super::record::CalibrationRecord;
use crate::solver::HarnessError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading, writing or producing calibrations
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid calibration record: {0}")]
    InvalidRecord(String),

    #[error("Corrupt calibration record for {scenario}: {reason}")]
    CorruptRecord { scenario: String, reason: String },

    #[error("Invalid scenario name: {0:?}")]
    InvalidScenarioName(String),

    #[error("Scenario {0} is not a calibrated scenario")]
    NotCalibratable(String),

    #[error("Trial failed while calibrating {scenario}: {source}")]
    Trial {
        scenario: String,
        #[source]
        source: HarnessError,
    },

    #[error("Date parsing error: {0}")]
    DateParse(String),

    #[error("Calibration store lock poisoned")]
    LockPoisoned,
}

/// Result type for calibration operations
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Persistent per-scenario (successes, trials) records
///
/// Implementations must be thread-safe (Send + Sync). Writers to the same
/// scenario are not coordinated; calibration is an offline, operator-run
/// step.
pub trait CalibrationStore: Send + Sync {
    /// Load the record for a scenario, if one exists
    fn load(&self, scenario: &str) -> CalibrationResult<Option<CalibrationRecord>>;

    /// Create or replace the record for a scenario
    fn save(&self, scenario: &str, record: &CalibrationRecord) -> CalibrationResult<()>;

    /// Whether a record exists for a scenario
    fn contains(&self, scenario: &str) -> CalibrationResult<bool> {
        Ok(self.load(scenario)?.is_some())
    }

    /// All recorded scenario names, sorted
    fn list(&self) -> CalibrationResult<Vec<String>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: CalibrationStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> CalibrationResult<Self>;
}

/// Scenario names double as file names, so keep them to a safe alphabet
pub fn validate_scenario_name(name: &str) -> CalibrationResult<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if name.is_empty() || name.starts_with('.') || !name.chars().all(allowed) {
        return Err(CalibrationError::InvalidScenarioName(name.to_string()));
    }
    Ok(())
}
