//! YAML form of a pipeline: the only format templates are stored in.
//!
//! ```yaml
//! version: 1
//! metadata:
//!   name: Checkout service
//!   description: ''
//!   enterprise: acme
//!   entity: payments
//!   deploymentType: Integration
//! nodes:
//! - id: build
//!   type: build_jenkins
//!   label: Jenkins
//!   position:
//!     x: 300.0
//!     y: 100.0
//!   status: pending
//! edges:
//! - id: e-build-test
//!   source: build
//!   target: test
//!   type: smoothstep
//! ```
//!
//! Field order is fixed by the document structs, so encoding the same graph
//! twice yields identical text.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::error::DecodeError;
use crate::graph::{Edge, Graph, Node, NodeKind, NodeStatus, PipelineMetadata, Position, DEFAULT_EDGE_TYPE};

pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PipelineDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    metadata: PipelineMetadata,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeEntry {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    position: Position,
    #[serde(default)]
    status: NodeStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    stage: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeEntry {
    id: String,
    source: String,
    target: String,
    #[serde(rename = "type", default = "default_edge_type")]
    edge_type: String,
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

impl From<&Node> for NodeEntry {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind.clone(),
            label: Some(node.label.clone()),
            position: node.position,
            status: node.status,
            identifier: node.identifier.clone(),
            stage: node.stage.clone(),
        }
    }
}

impl From<NodeEntry> for Node {
    fn from(entry: NodeEntry) -> Self {
        let label = entry.label.unwrap_or_else(|| entry.kind.default_label());
        Node {
            id: entry.id,
            kind: entry.kind,
            label,
            position: entry.position,
            status: entry.status,
            identifier: entry.identifier,
            stage: entry.stage,
        }
    }
}

impl From<&Edge> for EdgeEntry {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            edge_type: edge.edge_type.clone(),
        }
    }
}

impl From<EdgeEntry> for Edge {
    fn from(entry: EdgeEntry) -> Self {
        Edge {
            id: entry.id,
            source: entry.source,
            target: entry.target,
            edge_type: entry.edge_type,
        }
    }
}

pub fn encode(graph: &Graph, metadata: &PipelineMetadata) -> Result<String, DecodeError> {
    let document = PipelineDocument {
        version: DOCUMENT_VERSION,
        metadata: metadata.clone(),
        nodes: graph.nodes.iter().map(NodeEntry::from).collect(),
        edges: graph.edges.iter().map(EdgeEntry::from).collect(),
    };
    Ok(serde_yaml::to_string(&document)?)
}

pub fn decode(text: &str) -> Result<(Graph, PipelineMetadata), DecodeError> {
    if text.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let document: PipelineDocument = serde_yaml::from_str(text)?;
    if document.version != DOCUMENT_VERSION {
        return Err(DecodeError::UnsupportedVersion(document.version));
    }

    debug!(nodes = document.nodes.len(), edges = document.edges.len(), "Decoded pipeline document");

    let graph = Graph {
        nodes: document.nodes.into_iter().map(Node::from).collect(),
        edges: document.edges.into_iter().map(Edge::from).collect(),
    };
    Ok((graph, document.metadata))
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<(Graph, PipelineMetadata), DecodeError> {
    let text = fs::read_to_string(path.as_ref())?;
    decode(&text)
}

pub fn save_to_file(path: impl AsRef<Path>, graph: &Graph, metadata: &PipelineMetadata) -> Result<(), DecodeError> {
    let text = encode(graph, metadata)?;
    fs::write(path.as_ref(), text)?;
    Ok(())
}
