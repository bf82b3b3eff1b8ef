//! Reachability queries behind hover and click highlighting.
//!
//! Adjacency is rebuilt from the current edge list and never cached across
//! graph versions. Every query is iterative and tracks visited nodes, so
//! cyclic lineage terminates in O(V + E).

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::ir::LineageEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalDirection {
    /// Follow edges against their direction (toward sources).
    Upstream,
    /// Follow edges along their direction (toward consumers).
    Downstream,
    Both,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    /// target -> sources
    pub upstream: HashMap<String, HashSet<String>>,
    /// source -> targets
    pub downstream: HashMap<String, HashSet<String>>,
}

impl Adjacency {
    pub fn from_edges(edges: &[LineageEdge]) -> Self {
        let mut upstream: HashMap<String, HashSet<String>> = HashMap::new();
        let mut downstream: HashMap<String, HashSet<String>> = HashMap::new();
        for edge in edges {
            upstream
                .entry(edge.target.clone())
                .or_default()
                .insert(edge.source.clone());
            downstream
                .entry(edge.source.clone())
                .or_default()
                .insert(edge.target.clone());
        }
        Self {
            upstream,
            downstream,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty() && self.downstream.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<String>,
}

/// Everything connected to `node_id` through edges in either direction,
/// including `node_id` itself.
pub fn reachable_from(node_id: &str, adjacency: &Adjacency) -> BTreeSet<String> {
    reachable_directed(node_id, adjacency, TraversalDirection::Both)
}

pub fn reachable_directed(
    node_id: &str,
    adjacency: &Adjacency,
    direction: TraversalDirection,
) -> BTreeSet<String> {
    let follow_up = matches!(
        direction,
        TraversalDirection::Upstream | TraversalDirection::Both
    );
    let follow_down = matches!(
        direction,
        TraversalDirection::Downstream | TraversalDirection::Both
    );

    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![node_id];
    visited.insert(node_id);

    while let Some(current) = stack.pop() {
        if follow_up {
            if let Some(sources) = adjacency.upstream.get(current) {
                for source in sources {
                    if visited.insert(source.as_str()) {
                        stack.push(source.as_str());
                    }
                }
            }
        }
        if follow_down {
            if let Some(targets) = adjacency.downstream.get(current) {
                for target in targets {
                    if visited.insert(target.as_str()) {
                        stack.push(target.as_str());
                    }
                }
            }
        }
    }

    visited.into_iter().map(str::to_string).collect()
}

/// Edges whose two endpoints are both highlighted.
pub fn highlighted_edges(nodes: &BTreeSet<String>, edges: &[LineageEdge]) -> BTreeSet<String> {
    edges
        .iter()
        .filter(|edge| nodes.contains(&edge.source) && nodes.contains(&edge.target))
        .map(|edge| edge.id.clone())
        .collect()
}

pub fn highlight(node_id: &str, edges: &[LineageEdge]) -> Highlight {
    highlight_directed(node_id, edges, TraversalDirection::Both)
}

pub fn highlight_directed(
    node_id: &str,
    edges: &[LineageEdge],
    direction: TraversalDirection,
) -> Highlight {
    let adjacency = Adjacency::from_edges(edges);
    let nodes = reachable_directed(node_id, &adjacency, direction);
    let edges = highlighted_edges(&nodes, edges);
    Highlight { nodes, edges }
}
