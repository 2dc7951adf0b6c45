//! Feasibility checks run before the solver is invoked
//!
//! Each check rejects a configuration that no embedding could satisfy, so
//! the (much more expensive) solver call is skipped.

use super::types::{ChainConstraints, ChainMap};
use crate::graph::{AsGraph, Graph, NodeLabel};
use std::fmt;
use thiserror::Error;

/// Which constraint dictionary an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainRole {
    Fixed,
    Initial,
    Restrict,
}

impl fmt::Display for ChainRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChainRole::Fixed => "fixed_chains",
            ChainRole::Initial => "initial_chains",
            ChainRole::Restrict => "restrict_chains",
        })
    }
}

/// Configuration errors detected before solving
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreflightError<S, T> {
    #[error("target graph is not connected")]
    TargetDisconnected,

    #[error("source graph is not connected")]
    SourceDisconnected,

    #[error("{role} variable {variable:?} is not contained in the source graph")]
    UnknownVariable { role: ChainRole, variable: S },

    #[error("{role} chain for {variable:?} includes {node:?}, which is not in the target graph")]
    UnknownNode { role: ChainRole, variable: S, node: T },

    #[error("fixed chain for {0:?} overwrites its initial chain")]
    FixedOverridesInitial(S),

    #[error("fixed chain for {0:?} is also restricted")]
    FixedIsRestricted(S),

    #[error("{0:?} has no initial chain but initialization is skipped")]
    MissingInitialChain(S),

    #[error("{u:?} and {v:?} are connected as variables but not as initial chains")]
    InitialChainsNotAdjacent { u: S, v: S },

    #[error("{u:?} and {v:?} are connected as variables but not as domains")]
    DomainsNotAdjacent { u: S, v: S },
}

pub type PreflightResult<S, T> = Result<(), PreflightError<S, T>>;

/// Check graphs and chain dictionaries for feasibility
pub fn check_args<S, T, Q, A>(
    source: &Q,
    target: &A,
    constraints: &ChainConstraints<S, T>,
) -> PreflightResult<S, T>
where
    S: NodeLabel,
    T: NodeLabel,
    Q: AsGraph<S> + ?Sized,
    A: AsGraph<T> + ?Sized,
{
    let source = source.as_graph();
    let target = target.as_graph();

    if !target.is_connected() {
        return Err(PreflightError::TargetDisconnected);
    }
    if !source.is_connected() {
        return Err(PreflightError::SourceDisconnected);
    }

    if let Some(fixed) = &constraints.fixed {
        check_membership(&source, &target, fixed, ChainRole::Fixed)?;
        for variable in fixed.keys() {
            if constraints
                .initial
                .as_ref()
                .is_some_and(|initial| initial.contains_key(variable))
            {
                return Err(PreflightError::FixedOverridesInitial(variable.clone()));
            }
            if constraints
                .restrict
                .as_ref()
                .is_some_and(|restrict| restrict.contains_key(variable))
            {
                return Err(PreflightError::FixedIsRestricted(variable.clone()));
            }
        }
    }

    if let Some(initial) = &constraints.initial {
        check_membership(&source, &target, initial, ChainRole::Initial)?;
        if constraints.skip_initialization {
            check_initial_adjacency(&source, &target, initial)?;
        }
    }

    if let Some(restrict) = &constraints.restrict {
        check_membership(&source, &target, restrict, ChainRole::Restrict)?;
        check_domain_adjacency(&source, &target, restrict)?;
    }

    Ok(())
}

fn check_membership<S: NodeLabel, T: NodeLabel>(
    source: &Graph<S>,
    target: &Graph<T>,
    chains: &ChainMap<S, T>,
    role: ChainRole,
) -> PreflightResult<S, T> {
    for (variable, chain) in chains {
        if !source.contains(variable) {
            return Err(PreflightError::UnknownVariable {
                role,
                variable: variable.clone(),
            });
        }
        if let Some(node) = chain.iter().find(|q| !target.contains(q)) {
            return Err(PreflightError::UnknownNode {
                role,
                variable: variable.clone(),
                node: node.clone(),
            });
        }
    }
    Ok(())
}

/// True when `chain_u` meets the closed neighbourhood of `chain_v`
fn chains_touch<T: NodeLabel>(target: &Graph<T>, chain_u: &[T], chain_v: &[T]) -> bool {
    let reach = target.closed_neighborhood(chain_v);
    chain_u.iter().any(|q| reach.contains(q))
}

fn check_initial_adjacency<S: NodeLabel, T: NodeLabel>(
    source: &Graph<S>,
    target: &Graph<T>,
    initial: &ChainMap<S, T>,
) -> PreflightResult<S, T> {
    let chain_of = |variable: &S| {
        initial
            .get(variable)
            .ok_or_else(|| PreflightError::MissingInitialChain(variable.clone()))
    };
    for (u, v) in source.edges() {
        if !chains_touch(target, chain_of(u)?, chain_of(v)?) {
            return Err(PreflightError::InitialChainsNotAdjacent {
                u: u.clone(),
                v: v.clone(),
            });
        }
    }
    Ok(())
}

fn check_domain_adjacency<S: NodeLabel, T: NodeLabel>(
    source: &Graph<S>,
    target: &Graph<T>,
    restrict: &ChainMap<S, T>,
) -> PreflightResult<S, T> {
    let everything: Vec<T> = target.nodes().cloned().collect();
    let domain_of = |variable: &S| restrict.get(variable).unwrap_or(&everything);
    for (u, v) in source.edges() {
        if !chains_touch(target, domain_of(u), domain_of(v)) {
            return Err(PreflightError::DomainsNotAdjacent {
                u: u.clone(),
                v: v.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: u32) -> Graph<u32> {
        Graph::from_edges((1..n).map(|i| (i - 1, i)))
    }

    fn chains(entries: &[(u32, &[u32])]) -> ChainMap<u32, u32> {
        entries.iter().map(|(v, c)| (*v, c.to_vec())).collect()
    }

    fn none() -> ChainConstraints<u32, u32> {
        ChainConstraints::new()
    }

    #[test]
    fn connected_pair_passes() {
        assert_eq!(check_args(&path(4), &path(6), &none()), Ok(()));
    }

    #[test]
    fn disconnected_target() {
        let target = path(3).with_nodes([10]);
        assert_eq!(
            check_args(&path(3), &target, &none()),
            Err(PreflightError::TargetDisconnected)
        );
    }

    #[test]
    fn disconnected_source() {
        let source = Graph::<u32>::from_edges([(0, 1), (2, 3)]);
        assert_eq!(
            check_args(&source, &path(4), &none()),
            Err(PreflightError::SourceDisconnected)
        );
    }

    #[test]
    fn empty_graphs_are_disconnected() {
        let empty: Vec<(u32, u32)> = Vec::new();
        assert_eq!(
            check_args(&path(2), &empty, &none()),
            Err(PreflightError::TargetDisconnected)
        );
    }

    #[test]
    fn unknown_fixed_variable() {
        let constraints = none().with_fixed(chains(&[(7, &[0])]));
        assert_eq!(
            check_args(&path(3), &path(3), &constraints),
            Err(PreflightError::UnknownVariable {
                role: ChainRole::Fixed,
                variable: 7
            })
        );
    }

    #[test]
    fn unknown_restrict_node() {
        let constraints = none().with_restrict(chains(&[(0, &[0, 42])]));
        assert_eq!(
            check_args(&path(3), &path(3), &constraints),
            Err(PreflightError::UnknownNode {
                role: ChainRole::Restrict,
                variable: 0,
                node: 42
            })
        );
    }

    #[test]
    fn fixed_and_initial_conflict() {
        let constraints = none()
            .with_fixed(chains(&[(1, &[1])]))
            .with_initial(chains(&[(1, &[1])]));
        assert_eq!(
            check_args(&path(3), &path(3), &constraints),
            Err(PreflightError::FixedOverridesInitial(1))
        );
    }

    #[test]
    fn fixed_and_restrict_conflict() {
        let constraints = none()
            .with_fixed(chains(&[(1, &[1])]))
            .with_restrict(chains(&[(1, &[1, 2])]));
        assert_eq!(
            check_args(&path(3), &path(3), &constraints),
            Err(PreflightError::FixedIsRestricted(1))
        );
    }

    #[test]
    fn skipped_initialization_requires_touching_chains() {
        let good = chains(&[(0, &[0]), (1, &[1]), (2, &[2])]);
        let constraints = none().with_initial(good).skip_initialization(true);
        assert_eq!(check_args(&path(3), &path(5), &constraints), Ok(()));

        // 0 and 1 adjacent as variables, but their chains are three apart
        let bad = chains(&[(0, &[0]), (1, &[3]), (2, &[4])]);
        let constraints = none().with_initial(bad).skip_initialization(true);
        assert_eq!(
            check_args(&path(3), &path(5), &constraints),
            Err(PreflightError::InitialChainsNotAdjacent { u: 0, v: 1 })
        );
    }

    #[test]
    fn overlapping_initial_chains_touch() {
        let shared = chains(&[(0, &[2]), (1, &[2])]);
        let constraints = none().with_initial(shared).skip_initialization(true);
        assert_eq!(check_args(&path(2), &path(5), &constraints), Ok(()));
    }

    #[test]
    fn skipped_initialization_without_chain() {
        let partial = chains(&[(0, &[0])]);
        let constraints = none().with_initial(partial).skip_initialization(true);
        assert_eq!(
            check_args(&path(2), &path(3), &constraints),
            Err(PreflightError::MissingInitialChain(1))
        );
    }

    #[test]
    fn initial_chains_are_hints_without_skip() {
        let far = chains(&[(0, &[0]), (1, &[4])]);
        let constraints = none().with_initial(far);
        assert_eq!(check_args(&path(2), &path(5), &constraints), Ok(()));
    }

    #[test]
    fn distant_domains_are_infeasible() {
        let doms = chains(&[(0, &[0]), (1, &[3, 4])]);
        let constraints = none().with_restrict(doms);
        assert_eq!(
            check_args(&path(2), &path(5), &constraints),
            Err(PreflightError::DomainsNotAdjacent { u: 0, v: 1 })
        );
    }

    #[test]
    fn unrestricted_side_uses_whole_target() {
        let doms = chains(&[(0, &[4])]);
        let constraints = none().with_restrict(doms);
        assert_eq!(check_args(&path(3), &path(5), &constraints), Ok(()));
    }
}
