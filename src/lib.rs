//! embedcheck: correctness oracle and calibrated test harness for
//! minor-embedding solvers
//!
//! A minor embedding maps every vertex of a source graph to a connected,
//! vertex-disjoint chain of target vertices such that every source edge is
//! realized by at least one target edge between the two chains. Solvers
//! that search for such embeddings are randomized, so testing them needs
//! two things this crate provides:
//!
//! - **Validation**: [`check_embedding`] decides whether a proposed
//!   embedding is valid (with chain constraints), and [`check_args`]
//!   rejects misconfigured problems before a solver is invoked.
//! - **Calibrated retries**: [`SequentialOracle`] retries a scenario until
//!   its first success, up to a budget derived from a stored
//!   [`CalibrationRecord`] so that a correct solver fails with probability
//!   below `accept_prob`.
//!
//! # Example
//!
//! ```
//! use embedcheck::{check_embedding, ChainConstraints, Graph};
//!
//! let source = Graph::from_edges([("a", "b"), ("b", "c"), ("a", "c")]);
//! let target = Graph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)]);
//! let embedding = [("a", vec![0]), ("b", vec![1]), ("c", vec![2, 3])]
//!     .into_iter()
//!     .collect();
//!
//! let report = check_embedding(&source, &target, &embedding, &ChainConstraints::new());
//! assert!(report.is_valid());
//! ```

pub mod calibration;
pub mod cli;
pub mod config;
mod graph;
pub mod interrupt;
pub mod oracle;
pub mod solver;
pub mod validate;

pub use calibration::{
    CalibrationError, CalibrationRecord, CalibrationReport, CalibrationResult, CalibrationStore,
    Calibrator, DirectoryStore, MemoryStore, OpenStore, SqliteStore,
};
pub use config::{ConfigError, HarnessConfig};
pub use graph::{AsGraph, Graph, NodeLabel};
pub use interrupt::{
    run_interrupt_protocol, InterruptError, InterruptOutcome, InterruptSupport, InterruptTiming,
    WorkerCommand, WorkerExit,
};
pub use oracle::{
    OracleError, OracleResult, OracleVerdict, Scenario, ScenarioKind, ScenarioRegistry,
    SequentialOracle, SurveyReport, TrialPlan, DEFAULT_ACCEPT_PROB,
};
pub use solver::{
    ChainLengthProfile, CheckedOutput, CheckedSolver, EmbedOptions, HarnessError, HarnessResult,
    Solver, SolverError, SolverOutput,
};
pub use validate::{
    check_args, check_embedding, ChainConstraints, ChainMap, ChainRole, ConstraintWarning,
    Embedding, ErrorCode, PreflightError, Rejection, ValidationReport, WarningCode,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
