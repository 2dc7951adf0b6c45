//! Undirected graphs over opaque node labels
//!
//! Source and target graphs share one representation. Labels only need
//! equality and hashing; nodes keep their insertion order so that every walk
//! over a graph (and therefore every diagnostic derived from one) is
//! deterministic for a given input.

mod adapter;


pub use adapter::AsGraph;

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// Anything usable as a node label.
pub trait NodeLabel: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> NodeLabel for T {}

/// An undirected graph with optional self-loops
///
/// A self-loop is how an isolated node is expressed in an edge list: the node
/// exists but has no neighbour other than itself.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    nodes: Vec<N>,
    index: HashMap<N, usize>,
    adjacency: Vec<BTreeSet<usize>>,
    edge_count: usize,
}

impl<N: NodeLabel> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NodeLabel> Graph<N> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            edge_count: 0,
        }
    }

    /// Build a graph from an edge list; endpoints become nodes
    pub fn from_edges(edges: impl IntoIterator<Item = (N, N)>) -> Self {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Add nodes without edges
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
        for node in nodes {
            self.add_node(node);
        }
        self
    }

    /// Insert a node if absent, returning its index
    pub fn add_node(&mut self, node: N) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        self.adjacency.push(BTreeSet::new());
        i
    }

    /// Insert an undirected edge (both endpoints are added as needed)
    pub fn add_edge(&mut self, u: N, v: N) {
        let i = self.add_node(u);
        let j = self.add_node(v);
        if self.adjacency[i].insert(j) {
            if i != j {
                self.adjacency[j].insert(i);
            }
            self.edge_count += 1;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Iterate nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter()
    }

    /// Iterate each undirected edge once, self-loops included
    pub fn edges(&self) -> impl Iterator<Item = (&N, &N)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(i, adj)| {
            adj.range(i..).map(move |&j| (&self.nodes[i], &self.nodes[j]))
        })
    }

    pub fn has_edge(&self, u: &N, v: &N) -> bool {
        match (self.index.get(u), self.index.get(v)) {
            (Some(&i), Some(&j)) => self.adjacency[i].contains(&j),
            _ => false,
        }
    }

    /// Neighbours of a node (a self-loop lists the node itself)
    pub fn neighbors<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + 'a {
        self.index
            .get(node)
            .into_iter()
            .flat_map(move |&i| self.adjacency[i].iter().map(move |&j| &self.nodes[j]))
    }

    /// True when the graph is a single connected component
    ///
    /// The empty graph has no component and is reported as disconnected.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let all: HashSet<usize> = (0..self.nodes.len()).collect();
        self.spans_connected(&all)
    }

    /// True when `nodes` induces a connected subgraph
    ///
    /// Labels absent from the graph are dropped before the walk, so a
    /// selection of only unknown labels counts as connected. An empty
    /// selection is not connected.
    pub fn induces_connected<'a>(&self, nodes: impl IntoIterator<Item = &'a N>) -> bool
    where
        N: 'a,
    {
        let mut empty = true;
        let mut known = HashSet::new();
        for node in nodes {
            empty = false;
            if let Some(&i) = self.index.get(node) {
                known.insert(i);
            }
        }
        if empty {
            return false;
        }
        known.is_empty() || self.spans_connected(&known)
    }

    /// Union of `nodes` and all of their neighbours
    ///
    /// Labels absent from the graph are ignored.
    pub fn closed_neighborhood<'a, 'b>(
        &'a self,
        nodes: impl IntoIterator<Item = &'b N>,
    ) -> HashSet<&'a N>
    where
        N: 'b,
    {
        let mut out = HashSet::new();
        for node in nodes {
            if let Some(&i) = self.index.get(node) {
                out.insert(&self.nodes[i]);
                out.extend(self.adjacency[i].iter().map(|&j| &self.nodes[j]));
            }
        }
        out
    }

    pub(crate) fn label(&self, index: usize) -> &N {
        &self.nodes[index]
    }

    /// Edges as index pairs `(i, j)` with `i <= j`
    pub(crate) fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, adj)| adj.range(i..).map(move |&j| (i, j)))
    }

    /// BFS restricted to `subset`; true when it reaches every member
    fn spans_connected(&self, subset: &HashSet<usize>) -> bool {
        let Some(&start) = subset.iter().min() else {
            return false;
        };
        let mut visited = HashSet::with_capacity(subset.len());
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &next in &self.adjacency[current] {
                if subset.contains(&next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.len() == subset.len()
    }
}

impl<N: NodeLabel> FromIterator<(N, N)> for Graph<N> {
    fn from_iter<I: IntoIterator<Item = (N, N)>>(iter: I) -> Self {
        Self::from_edges(iter)
    }
}

impl<N: NodeLabel> From<Vec<(N, N)>> for Graph<N> {
    fn from(edges: Vec<(N, N)>) -> Self {
        Self::from_edges(edges)
    }
}
