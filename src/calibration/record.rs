//! The persisted (successes, trials) pair

use super::traits::{CalibrationError, CalibrationResult};
use serde::{Deserialize, Serialize};

/// Empirical success count for one scenario
///
/// Stored as `{"successes": S, "trials": N}` and nothing else. Parsing
/// rejects unknown fields, non-integers, `N == 0` and `S > N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationRecord {
    pub successes: u64,
    pub trials: u64,
}

impl CalibrationRecord {
    pub fn new(successes: u64, trials: u64) -> CalibrationResult<Self> {
        if trials == 0 {
            return Err(CalibrationError::InvalidRecord(
                "trial count must be positive".to_string(),
            ));
        }
        if successes > trials {
            return Err(CalibrationError::InvalidRecord(format!(
                "{} successes out of {} trials",
                successes, trials
            )));
        }
        Ok(Self { successes, trials })
    }

    /// Empirical success probability `S / N`
    pub fn success_rate(&self) -> f64 {
        self.successes as f64 / self.trials as f64
    }

    pub fn to_json(&self) -> CalibrationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a stored record
    pub fn from_json(text: &str) -> CalibrationResult<Self> {
        let raw: Self = serde_json::from_str(text)?;
        Self::new(raw.successes, raw.trials)
    }

    /// Like [`from_json`](Self::from_json), with failures attributed to `scenario`
    pub(crate) fn parse_for(scenario: &str, text: &str) -> CalibrationResult<Self> {
        Self::from_json(text).map_err(|e| CalibrationError::CorruptRecord {
            scenario: scenario.to_string(),
            reason: e.to_string(),
        })
    }
}
