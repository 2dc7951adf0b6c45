//! The embedding solver as seen by the harness
//!
//! The solver is an external, randomized collaborator. This module defines
//! the call shape the harness relies on, the options forwarded to it, and
//! [`CheckedSolver`], which pins every call to a single attempt and runs the
//! validator over anything the solver claims as a success.

mod checked;
mod contract;

pub use checked::{ChainLengthProfile, CheckedOutput, CheckedSolver};
pub use contract::{
    probe_contract, probe_empty_source, probe_empty_target, probe_point_target,
    ContractViolation,
};

use crate::graph::{Graph, NodeLabel};
use crate::validate::{ChainConstraints, Embedding, ErrorCode, PreflightError};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Errors a solver may signal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The problem itself is malformed (e.g. an empty target graph)
    #[error("invalid problem: {0}")]
    Domain(String),

    /// The solver could not run on a well-formed problem
    #[error("solver failed: {0}")]
    Runtime(String),

    #[error("solver interrupted")]
    Interrupted,

    #[error("{0}")]
    Other(String),
}

/// Errors raised while running a harness trial
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// The solver claimed success for an embedding the validator rejects
    #[error("bad embedding reported as success ({code}): {detail}")]
    BadEmbedding { code: ErrorCode, detail: String },

    #[error("preflight check failed: {0}")]
    Preflight(String),

    #[error("{0}")]
    Other(String),
}

impl<S: NodeLabel, T: NodeLabel> From<PreflightError<S, T>> for HarnessError {
    fn from(err: PreflightError<S, T>) -> Self {
        HarnessError::Preflight(err.to_string())
    }
}

/// Result type for harness trials
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Options forwarded to the solver
///
/// Only `tries`, `verbose`, `return_overlap` and the chain constraints carry
/// meaning for the harness; everything else is passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedOptions<S, T> {
    /// Number of independent restarts
    pub tries: u32,
    /// Rounds without improvement before a restart
    pub max_no_improvement: Option<u64>,
    /// Rounds spent shortening chains once an embedding is found
    pub chainlength_patience: Option<u32>,
    pub inner_rounds: Option<u64>,
    /// Wall-clock budget for the whole call
    pub timeout: Option<Duration>,
    /// Worker threads for the solver's own pool
    pub threads: Option<u32>,
    pub verbose: u8,
    /// Catch interrupts and return the best embedding so far
    pub interactive: bool,
    /// Report a success flag alongside a possibly overlapping mapping
    pub return_overlap: bool,
    #[serde(flatten)]
    pub constraints: ChainConstraints<S, T>,
    /// Blobs each variable's chain must touch
    pub suspend_chains: Option<HashMap<S, Vec<Vec<T>>>>,
}

impl<S, T> Default for EmbedOptions<S, T> {
    fn default() -> Self {
        Self {
            tries: 10,
            max_no_improvement: None,
            chainlength_patience: None,
            inner_rounds: None,
            timeout: None,
            threads: None,
            verbose: 0,
            interactive: true,
            return_overlap: false,
            constraints: ChainConstraints::default(),
            suspend_chains: None,
        }
    }
}

impl<S: NodeLabel, T: NodeLabel> EmbedOptions<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_max_no_improvement(mut self, rounds: u64) -> Self {
        self.max_no_improvement = Some(rounds);
        self
    }

    pub fn with_chainlength_patience(mut self, patience: u32) -> Self {
        self.chainlength_patience = Some(patience);
        self
    }

    pub fn with_inner_rounds(mut self, rounds: u64) -> Self {
        self.inner_rounds = Some(rounds);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_threads(mut self, threads: u32) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn return_overlap(mut self, return_overlap: bool) -> Self {
        self.return_overlap = return_overlap;
        self
    }

    pub fn with_constraints(mut self, constraints: ChainConstraints<S, T>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_suspend_chains(mut self, suspend: HashMap<S, Vec<Vec<T>>>) -> Self {
        self.suspend_chains = Some(suspend);
        self
    }
}

/// What a solver call returns
#[derive(Debug, Clone)]
pub struct SolverOutput<S, T> {
    pub embedding: Embedding<S, T>,
    /// Present only when `return_overlap` was requested
    pub success: Option<bool>,
}

impl<S: Eq + std::hash::Hash, T: PartialEq> PartialEq for SolverOutput<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.embedding == other.embedding && self.success == other.success
    }
}

impl<S: Eq + std::hash::Hash, T: Eq> Eq for SolverOutput<S, T> {}

impl<S, T> SolverOutput<S, T> {
    pub fn new(embedding: Embedding<S, T>) -> Self {
        Self {
            embedding,
            success: None,
        }
    }

    pub fn with_overlap(embedding: Embedding<S, T>, success: bool) -> Self {
        Self {
            embedding,
            success: Some(success),
        }
    }

    /// Whether the solver claims this output is a valid embedding
    ///
    /// Without a success flag, a non-empty mapping is the claim.
    pub fn claims_success(&self) -> bool {
        self.success.unwrap_or(!self.embedding.is_empty())
    }
}

/// A minor-embedding solver
pub trait Solver<S, T> {
    fn embed(
        &self,
        source: &Graph<S>,
        target: &Graph<T>,
        options: &EmbedOptions<S, T>,
    ) -> Result<SolverOutput<S, T>, SolverError>;
}

impl<S, T, F> Solver<S, T> for F
where
    F: Fn(&Graph<S>, &Graph<T>, &EmbedOptions<S, T>) -> Result<SolverOutput<S, T>, SolverError>,
{
    fn embed(
        &self,
        source: &Graph<S>,
        target: &Graph<T>,
        options: &EmbedOptions<S, T>,
    ) -> Result<SolverOutput<S, T>, SolverError> {
        self(source, target, options)
    }
}
