//! Uniform graph view over the shapes callers hand us
//!
//! Scenarios describe graphs either as `Graph` values or as bare edge
//! lists. Validation code takes `&impl AsGraph<N>` and works on the borrowed
//! or freshly built `Graph` behind it.

use super::{Graph, NodeLabel};
use std::borrow::Cow;

/// Something that can be viewed as a [`Graph`]
pub trait AsGraph<N: NodeLabel> {
    fn as_graph(&self) -> Cow<'_, Graph<N>>;
}

impl<N: NodeLabel> AsGraph<N> for Graph<N> {
    fn as_graph(&self) -> Cow<'_, Graph<N>> {
        Cow::Borrowed(self)
    }
}

impl<N: NodeLabel> AsGraph<N> for [(N, N)] {
    fn as_graph(&self) -> Cow<'_, Graph<N>> {
        Cow::Owned(Graph::from_edges(self.iter().cloned()))
    }
}

impl<N: NodeLabel> AsGraph<N> for Vec<(N, N)> {
    fn as_graph(&self) -> Cow<'_, Graph<N>> {
        self.as_slice().as_graph()
    }
}

impl<N: NodeLabel, const K: usize> AsGraph<N> for [(N, N); K] {
    fn as_graph(&self) -> Cow<'_, Graph<N>> {
        self.as_slice().as_graph()
    }
}
