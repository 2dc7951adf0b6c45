//! Graph families and embeddings that are valid by construction

use embedcheck::{Embedding, Graph};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

pub fn path(n: u32) -> Graph<u32> {
    let mut g = Graph::new().with_nodes(0..n);
    for i in 1..n {
        g.add_edge(i - 1, i);
    }
    g
}

pub fn cycle(n: u32) -> Graph<u32> {
    let mut g = path(n);
    if n > 2 {
        g.add_edge(n - 1, 0);
    }
    g
}

pub fn complete(n: u32) -> Graph<u32> {
    let mut g = Graph::new().with_nodes(0..n);
    for i in 0..n {
        for j in 0..i {
            g.add_edge(j, i);
        }
    }
    g
}

/// `rows x cols` lattice, node `r * cols + c`
pub fn grid(rows: u32, cols: u32) -> Graph<u32> {
    let mut g = Graph::new().with_nodes(0..rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = r * cols + c;
            if c + 1 < cols {
                g.add_edge(v, v + 1);
            }
            if r + 1 < rows {
                g.add_edge(v, v + cols);
            }
        }
    }
    g
}

/// Source graph whose minor `embedding` is: one node per variable, an edge
/// wherever two chains touch
pub fn quotient(target: &Graph<u32>, embedding: &Embedding<u32, u32>) -> Graph<u32> {
    let owner: HashMap<u32, u32> = embedding
        .iter()
        .flat_map(|(&var, chain)| chain.iter().map(move |&q| (q, var)))
        .collect();

    let mut vars: Vec<u32> = embedding.keys().copied().collect();
    vars.sort_unstable();
    let mut source = Graph::new().with_nodes(vars);
    for (p, q) in target.edges() {
        if let (Some(&u), Some(&v)) = (owner.get(p), owner.get(q)) {
            if u != v {
                source.add_edge(u, v);
            }
        }
    }
    source
}

/// Grow `chains` connected, disjoint chains from random seeds until roughly
/// `fill` of the target is covered
pub fn grown_embedding(target: &Graph<u32>, chains: u32, fill: f64, seed: u64) -> Embedding<u32, u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nodes: Vec<u32> = target.nodes().copied().collect();
    nodes.shuffle(&mut rng);

    let mut owner: HashMap<u32, u32> = HashMap::new();
    let mut embedding: Embedding<u32, u32> = HashMap::new();
    for (var, &q) in (0..chains).zip(nodes.iter()) {
        owner.insert(q, var);
        embedding.insert(var, vec![q]);
    }

    let budget = (target.node_count() as f64 * fill) as usize;
    let mut stalled = 0;
    while owner.len() < budget && stalled < 1000 {
        let var = rng.gen_range(0..chains);
        let chain = &embedding[&var];
        let frontier: Vec<u32> = chain
            .iter()
            .flat_map(|q| target.neighbors(q).copied())
            .filter(|q| !owner.contains_key(q))
            .collect();
        match frontier.choose(&mut rng) {
            Some(&q) => {
                owner.insert(q, var);
                embedding.entry(var).or_default().push(q);
                stalled = 0;
            }
            None => stalled += 1,
        }
    }
    embedding
}
