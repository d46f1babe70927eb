//! Palette drag payloads -> new canvas nodes.

pub mod ids;
pub mod viewport;

use std::sync::Arc;
use serde::{Serialize, Deserialize};
use crate::error::ValidationError;
use crate::graph::{Node, NodeKind};

pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use viewport::{Projection, ScreenPoint, Viewport};

/// What the palette attaches to a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl DragPayload {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            tool_name: None,
        }
    }

    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    /// Accepts either the JSON object the palette writes or a bare type tag.
    pub fn parse(data: &str) -> Result<Self, ValidationError> {
        let data = data.trim();
        if data.is_empty() {
            return Err(ValidationError::MissingField("node type"));
        }
        if data.starts_with('{') {
            let payload: DragPayload = serde_json::from_str(data).map_err(|e| ValidationError::InvalidValue {
                field: "drag payload",
                reason: e.to_string(),
            })?;
            if payload.node_type.trim().is_empty() {
                return Err(ValidationError::MissingField("node type"));
            }
            return Ok(payload);
        }
        Ok(DragPayload::new(data))
    }
}

pub struct NodeFactory {
    ids: Arc<dyn IdGenerator>,
}

impl NodeFactory {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn create(&self, payload: &DragPayload, drop_point: ScreenPoint, projection: &dyn Projection) -> Node {
        let kind = NodeKind::parse(&payload.node_type);
        let position = projection.project(drop_point);
        let mut node = Node::new(self.ids.next_id("node"), kind, position);
        if let Some(tool) = payload.tool_name.as_deref().filter(|t| !t.trim().is_empty()) {
            node.label = tool.to_string();
        }
        node
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new(Arc::new(UuidIdGenerator))
    }
}
