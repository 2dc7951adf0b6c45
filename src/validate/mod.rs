//! Embedding validation and solver preflight checks
//!
//! [`check_embedding`] is the independent correctness oracle for solver
//! output. [`check_args`] rejects infeasible configurations before a solver
//! is ever called.

mod embedding;
mod preflight;
mod types;

pub use embedding::check_embedding;
pub use preflight::{check_args, ChainRole, PreflightError, PreflightResult};
pub use types::{
    ChainConstraints, ChainMap, ConstraintWarning, Embedding, ErrorCode, Rejection,
    ValidationReport, WarningCode,
};
