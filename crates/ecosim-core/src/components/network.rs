//! Social Graph
//!
//! Undirected graph whose nodes are 1:1 with agents. Nodes live in an arena
//! with a live mask: retiring a node drops its edges and hides it from
//! traversal and statistics, but its index stays addressable.

use bevy_ecs::prelude::*;
use std::collections::BTreeSet;

/// Index of a node in the arena
pub type NodeIndex = usize;

/// Resource: the social/operational tie network
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SocialGraph {
    adjacency: Vec<BTreeSet<NodeIndex>>,
    live: Vec<bool>,
    edge_count: usize,
}

impl SocialGraph {
    /// `n` live nodes, no edges
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); n],
            live: vec![true; n],
            edge_count: 0,
        }
    }

    /// Arena size, including retired nodes
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn live_node_count(&self) -> usize {
        self.live.iter().filter(|&&live| live).count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_live(&self, node: NodeIndex) -> bool {
        self.live.get(node).copied().unwrap_or(false)
    }

    /// Returns false for self-loops, duplicates, and retired or unknown nodes.
    pub fn add_edge(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        if a == b || !self.is_live(a) || !self.is_live(b) || self.has_edge(a, b) {
            return false;
        }
        self.adjacency[a].insert(b);
        self.adjacency[b].insert(a);
        self.edge_count += 1;
        true
    }

    pub fn remove_edge(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        if !self.has_edge(a, b) {
            return false;
        }
        self.adjacency[a].remove(&b);
        self.adjacency[b].remove(&a);
        self.edge_count -= 1;
        true
    }

    pub fn has_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.adjacency
            .get(a)
            .map(|neighbors| neighbors.contains(&b))
            .unwrap_or(false)
    }

    /// Neighbours in ascending index order
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|neighbors| neighbors.iter().copied())
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.adjacency.get(node).map(BTreeSet::len).unwrap_or(0)
    }

    /// Every edge once, as `(low, high)` pairs in ascending order
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, neighbors)| neighbors.range(a + 1..).map(move |&b| (a, b)))
    }

    /// Drop every edge of `node` and mark it retired. Returns the number of
    /// edges removed. Edges are not redistributed among former neighbours.
    pub fn retire(&mut self, node: NodeIndex) -> usize {
        if !self.is_live(node) {
            return 0;
        }
        let neighbors = std::mem::take(&mut self.adjacency[node]);
        for &other in &neighbors {
            self.adjacency[other].remove(&node);
        }
        self.edge_count -= neighbors.len();
        self.live[node] = false;
        neighbors.len()
    }

    /// `2|E| / (n(n-1))` over live nodes; 0.0 with fewer than two live nodes
    pub fn density(&self) -> f64 {
        let n = self.live_node_count();
        if n < 2 {
            return 0.0;
        }
        (2 * self.edge_count) as f64 / (n * (n - 1)) as f64
    }

    /// Fraction of neighbour pairs that are themselves linked.
    /// Nodes with degree < 2 have clustering 0.0.
    pub fn local_clustering(&self, node: NodeIndex) -> f64 {
        let neighbors: Vec<NodeIndex> = self.neighbors(node).collect();
        let degree = neighbors.len();
        if degree < 2 {
            return 0.0;
        }
        let mut links = 0usize;
        for (i, &a) in neighbors.iter().enumerate() {
            for &b in &neighbors[i + 1..] {
                if self.has_edge(a, b) {
                    links += 1;
                }
            }
        }
        (2 * links) as f64 / (degree * (degree - 1)) as f64
    }

    /// Mean local clustering over live nodes, counting degree < 2 nodes as
    /// 0.0; 0.0 when no node is live.
    pub fn average_clustering(&self) -> f64 {
        let live: Vec<NodeIndex> = (0..self.node_count()).filter(|&n| self.is_live(n)).collect();
        if live.is_empty() {
            return 0.0;
        }
        let total: f64 = live.iter().map(|&n| self.local_clustering(n)).sum();
        total / live.len() as f64
    }
}
