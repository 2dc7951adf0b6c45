//! Minor-embedding validation
//!
//! Checks, in order: every variable has a chain, chains are disjoint, chains
//! are connected in the target, labels exist, every source edge is realised
//! between the corresponding chains, fixed chains are reproduced. Restrict
//! domains are checked last and only ever produce a warning.

use super::types::{
    ChainConstraints, ConstraintWarning, Embedding, Rejection, ValidationReport,
};
use crate::graph::{AsGraph, Graph, NodeLabel};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Validate `embedding` of `source` into `target`
///
/// Pure and reentrant: the same inputs always produce the same report.
pub fn check_embedding<S, T, Q, A>(
    source: &Q,
    target: &A,
    embedding: &Embedding<S, T>,
    constraints: &ChainConstraints<S, T>,
) -> ValidationReport<S, T>
where
    S: NodeLabel,
    T: NodeLabel,
    Q: AsGraph<S> + ?Sized,
    A: AsGraph<T> + ?Sized,
{
    let source = source.as_graph();
    let target = target.as_graph();

    let rejection = structural_check(&source, &target, embedding)
        .and_then(|()| fixed_chain_check(embedding, constraints))
        .err();
    let warning = restrict_chain_check(embedding, constraints);

    if let Some(rejection) = &rejection {
        debug!(code = %rejection.code(), "embedding rejected: {}", rejection);
    }

    ValidationReport { rejection, warning }
}

fn structural_check<S: NodeLabel, T: NodeLabel>(
    source: &Graph<S>,
    target: &Graph<T>,
    embedding: &Embedding<S, T>,
) -> Result<(), Rejection<S, T>> {
    let mut chains = Vec::with_capacity(source.node_count());
    for variable in source.nodes() {
        match embedding.get(variable) {
            Some(chain) => chains.push(chain),
            None => {
                return Err(Rejection::MissingChain {
                    variable: variable.clone(),
                })
            }
        }
    }

    // Chains are indexed like source nodes, so owners are source indices.
    let mut owner: HashMap<&T, usize> = HashMap::new();
    for (x, chain) in chains.iter().enumerate() {
        for q in chain.iter() {
            if owner.insert(q, x).is_some() {
                return Err(Rejection::OverlappedChains { node: q.clone() });
            }
        }
    }

    for (x, chain) in chains.iter().enumerate() {
        if !target.induces_connected(chain.iter()) {
            return Err(Rejection::BrokenChain {
                variable: source.label(x).clone(),
                chain: chain.to_vec(),
            });
        }
    }

    for (variable, chain) in embedding {
        if !source.contains(variable) {
            return Err(Rejection::UnknownVariable {
                variable: variable.clone(),
            });
        }
        if let Some(node) = chain.iter().find(|q| !target.contains(q)) {
            return Err(Rejection::UnknownNode { node: node.clone() });
        }
    }

    let quotient = quotient_edges(target, &owner);
    for (i, j) in source.edge_indices() {
        if i != j && !quotient.contains(&(i, j)) {
            return Err(Rejection::MissingEdge {
                from: source.label(i).clone(),
                to: source.label(j).clone(),
            });
        }
    }

    Ok(())
}

/// Variable pairs `(min, max)` joined by at least one target edge
///
/// Target edges touching an unoccupied node are skipped.
fn quotient_edges<T: NodeLabel>(
    target: &Graph<T>,
    owner: &HashMap<&T, usize>,
) -> HashSet<(usize, usize)> {
    target
        .edges()
        .filter_map(|(p, q)| match (owner.get(p), owner.get(q)) {
            (Some(&a), Some(&b)) => Some((a.min(b), a.max(b))),
            _ => None,
        })
        .collect()
}

fn fixed_chain_check<S: NodeLabel, T: NodeLabel>(
    embedding: &Embedding<S, T>,
    constraints: &ChainConstraints<S, T>,
) -> Result<(), Rejection<S, T>> {
    let Some(fixed) = &constraints.fixed else {
        return Ok(());
    };
    for (variable, required) in fixed {
        let matches = embedding.get(variable).is_some_and(|chain| {
            chain.iter().collect::<HashSet<_>>() == required.iter().collect::<HashSet<_>>()
        });
        if !matches {
            return Err(Rejection::FixedChainMismatch {
                variable: variable.clone(),
            });
        }
    }
    Ok(())
}

fn restrict_chain_check<S: NodeLabel, T: NodeLabel>(
    embedding: &Embedding<S, T>,
    constraints: &ChainConstraints<S, T>,
) -> Option<ConstraintWarning<S>> {
    let restrict = constraints.restrict.as_ref()?;
    restrict.iter().find_map(|(variable, domain)| {
        let chain = embedding.get(variable)?;
        let domain: HashSet<&T> = domain.iter().collect();
        if chain.iter().all(|q| domain.contains(q)) {
            None
        } else {
            Some(ConstraintWarning::RestrictChainMismatch {
                variable: variable.clone(),
            })
        }
    })
}
