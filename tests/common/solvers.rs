//! Mock solvers
//!
//! All of them honour the degenerate-input contract: empty source gives an
//! empty mapping, empty target is a domain error, and a single-point
//! target that cannot host a larger source is a runtime error.

use embedcheck::{EmbedOptions, Embedding, Graph, Solver, SolverError, SolverOutput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

type Out = Result<SolverOutput<u32, u32>, SolverError>;

fn degenerate(source: &Graph<u32>, target: &Graph<u32>) -> Option<Out> {
    if source.is_empty() {
        return Some(Ok(SolverOutput::new(Embedding::new())));
    }
    if target.is_empty() {
        return Some(Err(SolverError::Domain("empty target graph".into())));
    }
    if target.node_count() == 1 && source.node_count() > 1 {
        return Some(Err(SolverError::Runtime(
            "cannot embed into a single point".into(),
        )));
    }
    None
}

/// Singleton chains `v -> [v]` when the source is a subgraph of the target
fn identity_embedding(source: &Graph<u32>, target: &Graph<u32>) -> Option<Embedding<u32, u32>> {
    let fits = source.nodes().all(|v| target.contains(v))
        && source.edges().all(|(u, v)| target.has_edge(u, v));
    fits.then(|| source.nodes().map(|&v| (v, vec![v])).collect())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IdentitySolver;

impl Solver<u32, u32> for IdentitySolver {
    fn embed(&self, source: &Graph<u32>, target: &Graph<u32>, _: &EmbedOptions<u32, u32>) -> Out {
        if let Some(out) = degenerate(source, target) {
            return out;
        }
        Ok(SolverOutput::new(
            identity_embedding(source, target).unwrap_or_default(),
        ))
    }
}

/// Finds the identity embedding only with probability `rate` per try
pub struct FlakySolver {
    rate: f64,
    rng: Mutex<StdRng>,
}

impl FlakySolver {
    pub fn new(rate: f64, seed: u64) -> Self {
        Self {
            rate,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Solver<u32, u32> for FlakySolver {
    fn embed(&self, source: &Graph<u32>, target: &Graph<u32>, options: &EmbedOptions<u32, u32>) -> Out {
        if let Some(out) = degenerate(source, target) {
            return out;
        }
        let mut rng = self.rng.lock().unwrap();
        let found = (0..options.tries).any(|_| rng.gen_bool(self.rate));
        let embedding = if found {
            identity_embedding(source, target).unwrap_or_default()
        } else {
            Embedding::new()
        };
        Ok(SolverOutput::new(embedding))
    }
}

/// A defective solver: claims success with every variable on target node 0
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlappingSolver;

impl Solver<u32, u32> for OverlappingSolver {
    fn embed(&self, source: &Graph<u32>, target: &Graph<u32>, _: &EmbedOptions<u32, u32>) -> Out {
        if let Some(out) = degenerate(source, target) {
            return out;
        }
        Ok(SolverOutput::new(
            source.nodes().map(|&v| (v, vec![0])).collect(),
        ))
    }
}
