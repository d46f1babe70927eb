//! Serial visit order used by the simulated pipeline run.
//!
//! This is not a topological sort. Roots (nodes nobody points at) are taken in
//! array order and each is walked depth-first along its outgoing edges in
//! edge order. A node is visited the first time it is reached and never again,
//! which keeps cycles and diamonds finite. Nodes that only sit on a cycle with
//! no root are not visited at all; [`unreachable`] lists them.

use std::collections::{HashMap, HashSet};
use crate::graph::{Graph, NodeId};

pub fn roots(graph: &Graph) -> Vec<NodeId> {
    root_ids(graph).into_iter().map(str::to_string).collect()
}

fn root_ids(graph: &Graph) -> Vec<&str> {
    let has_incoming: HashSet<&str> = graph.edges.iter().map(|e| e.target.as_str()).collect();
    graph.nodes.iter()
        .map(|n| n.id.as_str())
        .filter(|id| !has_incoming.contains(id))
        .collect()
}

pub fn execution_order(graph: &Graph) -> Vec<NodeId> {
    let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        if known.contains(edge.source.as_str()) && known.contains(edge.target.as_str()) {
            adjacency.entry(edge.source.as_str()).or_default().push(edge.target.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(graph.nodes.len());

    for root in root_ids(graph) {
        // Explicit stack, children pushed in reverse so they pop in edge order.
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id.to_string());
            if let Some(children) = adjacency.get(id) {
                for child in children.iter().rev() {
                    if !visited.contains(child) {
                        stack.push(*child);
                    }
                }
            }
        }
    }

    order
}

/// Node ids [`execution_order`] never reaches, in array order.
pub fn unreachable(graph: &Graph) -> Vec<NodeId> {
    let order: HashSet<NodeId> = execution_order(graph).into_iter().collect();
    let mut seen = HashSet::new();
    graph.nodes.iter()
        .filter(|n| !order.contains(&n.id) && seen.insert(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect()
}
