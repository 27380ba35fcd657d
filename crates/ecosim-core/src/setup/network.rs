//! Network Generator
//!
//! Small-world construction: a ring lattice where every node links to its
//! `k` nearest neighbours, then each lattice edge has its far endpoint
//! rewired with probability `p`.

use rand::rngs::SmallRng;
use rand::Rng;

use ecosim_records::ConfigurationError;

use crate::components::network::SocialGraph;

/// Attempts to find a fresh endpoint before an edge is left in place
pub const MAX_REWIRE_ATTEMPTS: usize = 32;

/// Build the initial social graph.
///
/// Odd `k` behaves like `k - 1` (each node links `k / 2` steps either way).
/// Every lattice edge consumes one draw whether or not it is rewired, so the
/// draw sequence depends only on `(n_nodes, k)` and the outcomes of earlier
/// rewires.
pub fn generate(
    n_nodes: usize,
    k: usize,
    p: f64,
    rng: &mut SmallRng,
) -> Result<SocialGraph, ConfigurationError> {
    if k < 2 {
        return Err(ConfigurationError::LatticeDegreeTooSmall(k as i64));
    }
    if k >= n_nodes {
        return Err(ConfigurationError::LatticeDegreeTooLarge { k, n_nodes });
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigurationError::ProbabilityOutOfRange {
            name: "network_p",
            value: p,
        });
    }
    if k % 2 == 1 {
        tracing::warn!("network_k = {} is odd; using a lattice degree of {}", k, k - 1);
    }

    let half = k / 2;
    let mut graph = SocialGraph::new(n_nodes);
    for offset in 1..=half {
        for u in 0..n_nodes {
            graph.add_edge(u, (u + offset) % n_nodes);
        }
    }

    let mut rewired = 0usize;
    for offset in 1..=half {
        for u in 0..n_nodes {
            let v = (u + offset) % n_nodes;
            if rng.gen::<f64>() >= p {
                continue;
            }
            // Already moved by an earlier rewire, or nowhere left to go
            if !graph.has_edge(u, v) || graph.degree(u) >= n_nodes - 1 {
                continue;
            }
            for _ in 0..MAX_REWIRE_ATTEMPTS {
                let w = rng.gen_range(0..n_nodes);
                if w != u && !graph.has_edge(u, w) {
                    graph.remove_edge(u, v);
                    graph.add_edge(u, w);
                    rewired += 1;
                    break;
                }
            }
        }
    }

    tracing::debug!(
        "Generated small-world graph: {} nodes, {} edges, {} rewired",
        n_nodes,
        graph.edge_count(),
        rewired
    );
    Ok(graph)
}
