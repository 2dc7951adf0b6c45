//! Single-try, validated solver calls

use super::{EmbedOptions, HarnessError, HarnessResult, Solver, SolverOutput};
use crate::graph::{AsGraph, NodeLabel};
use crate::validate::{check_embedding, Embedding, WarningCode};
use tracing::{debug, warn};

/// Solver output that survived validation
#[derive(Debug, Clone)]
pub struct CheckedOutput<S, T> {
    pub embedding: Embedding<S, T>,
    pub success: Option<bool>,
    /// Soft constraint warning raised by the validator
    pub warning: Option<WarningCode>,
}

impl<S: Eq + std::hash::Hash, T: PartialEq> PartialEq for CheckedOutput<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.embedding == other.embedding
            && self.success == other.success
            && self.warning == other.warning
    }
}

impl<S: Eq + std::hash::Hash, T: Eq> Eq for CheckedOutput<S, T> {}

impl<S, T> CheckedOutput<S, T> {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(!self.embedding.is_empty())
    }
}

/// Longest-chain lengths gathered over repeated single-try runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainLengthProfile {
    /// Longest chain of each successful run, ascending
    pub lengths: Vec<usize>,
    /// Runs that produced no embedding
    pub failures: u64,
}

impl ChainLengthProfile {
    pub fn runs(&self) -> u64 {
        self.lengths.len() as u64 + self.failures
    }

    /// Median longest chain over successful runs
    pub fn median(&self) -> Option<usize> {
        self.lengths.get(self.lengths.len() / 2).copied()
    }
}

/// Wraps a solver so each call is one attempt and every claimed success is
/// independently validated
///
/// A success the validator rejects is a solver defect and comes back as
/// [`HarnessError::BadEmbedding`]; it is never counted as a mere failure.
#[derive(Debug, Clone)]
pub struct CheckedSolver<Z> {
    inner: Z,
}

impl<Z> CheckedSolver<Z> {
    pub fn new(inner: Z) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Z {
        &self.inner
    }

    pub fn embed<S, T, Q, A>(
        &self,
        source: &Q,
        target: &A,
        options: &EmbedOptions<S, T>,
    ) -> HarnessResult<CheckedOutput<S, T>>
    where
        S: NodeLabel,
        T: NodeLabel,
        Q: AsGraph<S> + ?Sized,
        A: AsGraph<T> + ?Sized,
        Z: Solver<S, T>,
    {
        let source = source.as_graph();
        let target = target.as_graph();

        let mut options = options.clone();
        options.tries = 1;
        options.verbose = 0;

        let SolverOutput { embedding, success } = self.inner.embed(&source, &target, &options)?;
        let output = CheckedOutput {
            embedding,
            success,
            warning: None,
        };
        if !output.is_success() {
            debug!("solver reported failure");
            return Ok(output);
        }

        let report = check_embedding(&*source, &*target, &output.embedding, &options.constraints);
        if let Some(rejection) = report.rejection {
            return Err(HarnessError::BadEmbedding {
                code: rejection.code(),
                detail: rejection.to_string(),
            });
        }
        if let Some(warning) = &report.warning {
            warn!(code = %warning.code(), "{}", warning);
        }

        Ok(CheckedOutput {
            warning: report.warning_code(),
            ..output
        })
    }

    /// Runs `runs` validated single tries and records each run's longest chain
    pub fn chain_length_profile<S, T, Q, A>(
        &self,
        source: &Q,
        target: &A,
        options: &EmbedOptions<S, T>,
        runs: u64,
    ) -> HarnessResult<ChainLengthProfile>
    where
        S: NodeLabel,
        T: NodeLabel,
        Q: AsGraph<S> + ?Sized,
        A: AsGraph<T> + ?Sized,
        Z: Solver<S, T>,
    {
        let mut profile = ChainLengthProfile::default();
        for _ in 0..runs {
            let output = self.embed(source, target, options)?;
            match output.embedding.values().map(Vec::len).max() {
                Some(longest) if output.is_success() => profile.lengths.push(longest),
                _ => profile.failures += 1,
            }
        }
        profile.lengths.sort_unstable();
        debug!(
            runs,
            failures = profile.failures,
            median = ?profile.median(),
            "chain length profile"
        );
        Ok(profile)
    }
}
