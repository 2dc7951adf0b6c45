//! Embeddings, chain constraints and validation reports

use crate::graph::NodeLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Source variable → chain of target nodes
pub type Embedding<S, T> = HashMap<S, Vec<T>>;

/// Per-variable chain dictionary (fixed, initial or restrict)
pub type ChainMap<S, T> = HashMap<S, Vec<T>>;

/// Optional chain constraints attached to an embedding problem
#[derive(Debug, Clone, Serialize)]
pub struct ChainConstraints<S, T> {
    /// Chains that must be reproduced exactly
    #[serde(rename = "fixed_chains")]
    pub fixed: Option<ChainMap<S, T>>,
    /// Starting hints for the solver
    #[serde(rename = "initial_chains")]
    pub initial: Option<ChainMap<S, T>>,
    /// Domains each final chain should stay inside
    #[serde(rename = "restrict_chains")]
    pub restrict: Option<ChainMap<S, T>>,
    /// Treat `initial` as an authoritative partial embedding
    pub skip_initialization: bool,
}

impl<S, T> Default for ChainConstraints<S, T> {
    fn default() -> Self {
        Self {
            fixed: None,
            initial: None,
            restrict: None,
            skip_initialization: false,
        }
    }
}

impl<S: NodeLabel, T: NodeLabel> ChainConstraints<S, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed(mut self, fixed: ChainMap<S, T>) -> Self {
        self.fixed = Some(fixed);
        self
    }

    pub fn with_initial(mut self, initial: ChainMap<S, T>) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_restrict(mut self, restrict: ChainMap<S, T>) -> Self {
        self.restrict = Some(restrict);
        self
    }

    pub fn skip_initialization(mut self, skip: bool) -> Self {
        self.skip_initialization = skip;
        self
    }
}

/// Stable identifier for a structural violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingChain,
    OverlappedChains,
    BrokenChain,
    UnknownVariable,
    UnknownNode,
    MissingEdge,
    FixedChainMismatch,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingChain => "missing chain",
            ErrorCode::OverlappedChains => "overlapped chains",
            ErrorCode::BrokenChain => "broken chain",
            ErrorCode::UnknownVariable => "chain for nonexistent variable",
            ErrorCode::UnknownNode => "chain includes nonexistent node",
            ErrorCode::MissingEdge => "missing edge",
            ErrorCode::FixedChainMismatch => "fixed chain mismatch",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier for a soft constraint violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    RestrictChainMismatch,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::RestrictChainMismatch => "restrict chain mismatch",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an embedding is not a valid minor embedding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection<S, T> {
    #[error("missing chain for variable {variable:?}")]
    MissingChain { variable: S },

    #[error("overlapped chains at node {node:?}")]
    OverlappedChains { node: T },

    #[error("broken chain for {variable:?}: ({chain:?})")]
    BrokenChain { variable: S, chain: Vec<T> },

    #[error("chain for nonexistent variable {variable:?}")]
    UnknownVariable { variable: S },

    #[error("chain includes nonexistent node {node:?}")]
    UnknownNode { node: T },

    #[error("missing edge between {from:?} and {to:?}")]
    MissingEdge { from: S, to: S },

    #[error("fixed chain mismatch for {variable:?}")]
    FixedChainMismatch { variable: S },
}

impl<S, T> Rejection<S, T> {
    pub fn code(&self) -> ErrorCode {
        match self {
            Rejection::MissingChain { .. } => ErrorCode::MissingChain,
            Rejection::OverlappedChains { .. } => ErrorCode::OverlappedChains,
            Rejection::BrokenChain { .. } => ErrorCode::BrokenChain,
            Rejection::UnknownVariable { .. } => ErrorCode::UnknownVariable,
            Rejection::UnknownNode { .. } => ErrorCode::UnknownNode,
            Rejection::MissingEdge { .. } => ErrorCode::MissingEdge,
            Rejection::FixedChainMismatch { .. } => ErrorCode::FixedChainMismatch,
        }
    }
}

/// Advisory raised when an otherwise valid embedding bends a soft constraint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintWarning<S> {
    #[error("restrict chain mismatch for {variable:?}")]
    RestrictChainMismatch { variable: S },
}

impl<S> ConstraintWarning<S> {
    pub fn code(&self) -> WarningCode {
        match self {
            ConstraintWarning::RestrictChainMismatch { .. } => WarningCode::RestrictChainMismatch,
        }
    }
}

/// Outcome of a single validation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport<S, T> {
    /// First hard violation found, if any
    pub rejection: Option<Rejection<S, T>>,
    /// Soft violation, reported regardless of the verdict
    pub warning: Option<ConstraintWarning<S>>,
}

impl<S, T> ValidationReport<S, T> {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.rejection.as_ref().map(Rejection::code)
    }

    pub fn warning_code(&self) -> Option<WarningCode> {
        self.warning.as_ref().map(ConstraintWarning::code)
    }
}
