//! Sequential test oracle for randomized embedding scenarios
//!
//! A calibrated scenario is retried until its first success, up to the
//! number of attempts that pushes the false-negative probability below
//! `accept_prob`. A perfect scenario must succeed on every one of a fixed
//! number of runs.

mod plan;
mod registry;
mod sequential;

pub use plan::{TrialPlan, DEFAULT_ACCEPT_PROB};
pub use registry::{Scenario, ScenarioKind, ScenarioRegistry, TrialFn};
pub use sequential::{OracleVerdict, SequentialOracle, SurveyReport};

use crate::calibration::CalibrationError;
use crate::solver::HarnessError;
use thiserror::Error;

/// Errors surfaced by the oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{0} is not calibrated -- run calibrate_all() or calibrate_new()")]
    Uncalibrated(String),

    #[error(
        "{scenario}: took {tts} tries without success, this should only happen with probability {residual:.3e}"
    )]
    Exhausted {
        scenario: String,
        tts: u64,
        residual: f64,
    },

    #[error("{scenario}: attempt {attempt} of {runs} failed")]
    PerfectRunFailed {
        scenario: String,
        attempt: u64,
        runs: u64,
    },

    #[error("calibration recorded no successes in {trials} trials, no attempt budget can bound the false-negative rate")]
    NeverSucceeded { trials: u64 },

    #[error("acceptance probability must lie strictly between 0 and 1, got {0}")]
    InvalidAcceptProbability(f64),

    #[error("scenario {0} is already registered")]
    DuplicateScenario(String),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("{scenario}: trial error: {source}")]
    Trial {
        scenario: String,
        #[source]
        source: HarnessError,
    },
}

/// Result type for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;
