pub mod builder;
pub mod kind;
pub mod layout;

use std::collections::HashSet;
use serde::{Serialize, Deserialize};
use thiserror::Error;

pub use kind::{Appearance, Category, NodeKind};
pub use layout::GridLayout;

pub type NodeId = String;
pub type EdgeId = String;

pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl NodeStatus {
    /// Manual status cycling on the canvas: pending -> running -> completed -> failed -> pending
    pub fn next(self) -> Self {
        match self {
            NodeStatus::Pending => NodeStatus::Running,
            NodeStatus::Running => NodeStatus::Completed,
            NodeStatus::Completed => NodeStatus::Failed,
            NodeStatus::Failed => NodeStatus::Pending,
        }
    }
}

/// 画布上的节点
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub position: Position,
    pub status: NodeStatus,
    /// Display only
    pub identifier: String,
    /// Display only
    pub stage: String,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        let label = kind.default_label();
        Self {
            id: id.into(),
            kind,
            label,
            position,
            status: NodeStatus::Pending,
            identifier: String::new(),
            stage: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Rendering hint only
    pub edge_type: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: DEFAULT_EDGE_TYPE.to_string(),
        }
    }
}

pub const DEPLOYMENT_INTEGRATION: &str = "Integration";
pub const DEPLOYMENT_EXTENSION: &str = "Extension";

/// Header fields saved alongside the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enterprise: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub deployment_type: String,
}

impl PipelineMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deployment_type: DEPLOYMENT_INTEGRATION.to_string(),
            ..Default::default()
        }
    }
}

/// Structural problems found by [`Graph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),

    #[error("duplicate edge id: {0}")]
    DuplicateEdgeId(EdgeId),

    #[error("edge {edge_id} references missing node {node_id}")]
    DanglingEdge { edge_id: EdgeId, node_id: NodeId },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Appends without checking for an id collision; callers supply fresh ids.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Appends without checking that the endpoints exist.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Returns true when a node with `id` existed.
    pub fn update_node_status(&mut self, id: &str, status: NodeStatus) -> bool {
        let mut found = false;
        for node in self.nodes.iter_mut().filter(|n| n.id == id) {
            node.status = status;
            found = true;
        }
        found
    }

    pub fn reset_statuses(&mut self) {
        for node in &mut self.nodes {
            node.status = NodeStatus::Pending;
        }
    }

    /// Replaces every node's position with `layout(node, index)`.
    pub fn reposition_all<F>(&mut self, mut layout: F)
    where
        F: FnMut(&Node, usize) -> Position,
    {
        let positions: Vec<Position> = self.nodes.iter()
            .enumerate()
            .map(|(idx, node)| layout(node, idx))
            .collect();
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = position;
        }
    }

    /// Removes the node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let removed = self.nodes.remove(idx);
        self.edges.retain(|e| e.source != id && e.target != id);
        Some(removed)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let idx = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(idx))
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                issues.push(ValidationIssue::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                issues.push(ValidationIssue::DuplicateEdgeId(edge.id.clone()));
            }
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    issues.push(ValidationIssue::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        issues
    }
}
