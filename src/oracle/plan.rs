//! Attempt budgets derived from calibration records

use super::{OracleError, OracleResult};
use crate::calibration::CalibrationRecord;
use tracing::debug;

/// Default bound on the probability of a false negative
pub const DEFAULT_ACCEPT_PROB: f64 = 1e-4;

/// How many attempts a calibrated scenario gets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialPlan {
    /// Estimated per-attempt success probability
    pub success_rate: f64,
    /// Maximum number of attempts (`tts`)
    pub attempts: u64,
    /// Probability that a correct solver fails every attempt
    pub residual: f64,
}

impl TrialPlan {
    /// Smallest attempt count whose all-fail probability is below `accept_prob`
    ///
    /// A perfect record (`S == N`) is treated as `S / (N + 1)` so the
    /// estimate stays below one.
    pub fn from_record(record: &CalibrationRecord, accept_prob: f64) -> OracleResult<Self> {
        if !(accept_prob > 0.0 && accept_prob < 1.0) {
            return Err(OracleError::InvalidAcceptProbability(accept_prob));
        }
        if record.successes == 0 {
            return Err(OracleError::NeverSucceeded {
                trials: record.trials,
            });
        }

        let mut denominator = record.trials as f64;
        if record.successes == record.trials {
            denominator += 1.0;
        }
        let success_rate = record.successes as f64 / denominator;
        let miss = 1.0 - success_rate;

        let attempts = (accept_prob.ln() / miss.ln()).floor() as u64 + 1;
        let residual = miss.powf(attempts as f64);
        debug!(
            successes = record.successes,
            trials = record.trials,
            attempts,
            residual,
            "computed trial plan"
        );

        Ok(Self {
            success_rate,
            attempts,
            residual,
        })
    }

    pub fn with_default_accept(record: &CalibrationRecord) -> OracleResult<Self> {
        Self::from_record(record, DEFAULT_ACCEPT_PROB)
    }
}
