//! Probes for the degenerate-input contract every solver must honour
//!
//! - an empty source embeds as an empty mapping
//! - an empty target is a domain error, not an empty result
//! - a single isolated target point cannot host a multi-node source and
//!   fails with a runtime error

use super::{EmbedOptions, Solver, SolverError};
use crate::graph::Graph;
use thiserror::Error;

/// A way in which a solver breaks the degenerate-input contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("empty source must embed as an empty mapping, got {0} chains")]
    EmptySourceNotEmpty(usize),

    #[error("empty source was refused: {0}")]
    EmptySourceRefused(SolverError),

    #[error("empty target must raise a domain error, but a mapping was returned")]
    EmptyTargetAccepted,

    #[error("empty target must raise a domain error, got: {0}")]
    EmptyTargetWrongError(SolverError),

    #[error("single-point target must raise a runtime error, but a mapping was returned")]
    PointTargetAccepted,

    #[error("single-point target must raise a runtime error, got: {0}")]
    PointTargetWrongError(SolverError),
}

fn k2() -> Graph<u32> {
    Graph::from_edges([(0, 1)])
}

fn single_try() -> EmbedOptions<u32, u32> {
    EmbedOptions::new().with_tries(1)
}

pub fn probe_empty_source<Z: Solver<u32, u32>>(solver: &Z) -> Result<(), ContractViolation> {
    match solver.embed(&Graph::new(), &k2(), &single_try()) {
        Ok(output) if output.embedding.is_empty() => Ok(()),
        Ok(output) => Err(ContractViolation::EmptySourceNotEmpty(output.embedding.len())),
        Err(err) => Err(ContractViolation::EmptySourceRefused(err)),
    }
}

pub fn probe_empty_target<Z: Solver<u32, u32>>(solver: &Z) -> Result<(), ContractViolation> {
    match solver.embed(&k2(), &Graph::new(), &single_try()) {
        Err(SolverError::Domain(_)) => Ok(()),
        Err(err) => Err(ContractViolation::EmptyTargetWrongError(err)),
        Ok(_) => Err(ContractViolation::EmptyTargetAccepted),
    }
}

pub fn probe_point_target<Z: Solver<u32, u32>>(solver: &Z) -> Result<(), ContractViolation> {
    let point = Graph::from_edges([(0, 0)]);
    match solver.embed(&k2(), &point, &single_try()) {
        Err(SolverError::Runtime(_)) => Ok(()),
        Err(err) => Err(ContractViolation::PointTargetWrongError(err)),
        Ok(_) => Err(ContractViolation::PointTargetAccepted),
    }
}

/// Run every probe, collecting all violations
pub fn probe_contract<Z: Solver<u32, u32>>(solver: &Z) -> Vec<ContractViolation> {
    [
        probe_empty_source(solver),
        probe_empty_target(solver),
        probe_point_target(solver),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}
