use crate::graph::{Edge, Graph, GridLayout, Node, NodeKind, NodeStatus, PipelineMetadata, Position};

/// Fluent construction of a pipeline graph, used by the built-in flows and tests.
///
/// Nodes added with [`GraphBuilder::step`] are placed on the default grid in
/// insertion order; [`GraphBuilder::node`] allows explicit placement.
pub struct GraphBuilder {
    metadata: PipelineMetadata,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    grid: GridLayout,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            metadata: PipelineMetadata::named(name),
            nodes: Vec::new(),
            edges: Vec::new(),
            grid: GridLayout::default(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.metadata.description = description.to_string();
        self
    }

    pub fn enterprise(mut self, enterprise: &str) -> Self {
        self.metadata.enterprise = enterprise.to_string();
        self
    }

    pub fn entity(mut self, entity: &str) -> Self {
        self.metadata.entity = entity.to_string();
        self
    }

    pub fn deployment_type(mut self, deployment_type: &str) -> Self {
        self.metadata.deployment_type = deployment_type.to_string();
        self
    }

    /// Adds a node at the next grid slot.
    pub fn step(mut self, id: &str, kind: NodeKind) -> Self {
        let position = self.grid.position(self.nodes.len());
        self.nodes.push(Node::new(id, kind, position));
        self
    }

    pub fn node(self, id: &str, kind: NodeKind) -> NodeBuilder {
        let position = self.grid.position(self.nodes.len());
        NodeBuilder {
            graph_builder: self,
            node: Node::new(id, kind, position),
        }
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        let base = format!("e-{}-{}", source, target);
        let mut id = base.clone();
        let mut n = 1;
        while self.edges.iter().any(|e| e.id == id) {
            n += 1;
            id = format!("{}-{}", base, n);
        }
        self.edges.push(Edge::new(id, source, target));
        self
    }

    /// Connects each id to the next one.
    pub fn chain(mut self, ids: &[&str]) -> Self {
        for pair in ids.windows(2) {
            self = self.connect(pair[0], pair[1]);
        }
        self
    }

    pub fn build(self) -> (Graph, PipelineMetadata) {
        (
            Graph {
                nodes: self.nodes,
                edges: self.edges,
            },
            self.metadata,
        )
    }
}

pub struct NodeBuilder {
    graph_builder: GraphBuilder,
    node: Node,
}

impl NodeBuilder {
    pub fn label(mut self, label: &str) -> Self {
        self.node.label = label.to_string();
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.node.position = Position::new(x, y);
        self
    }

    pub fn status(mut self, status: NodeStatus) -> Self {
        self.node.status = status;
        self
    }

    pub fn identifier(mut self, identifier: &str) -> Self {
        self.node.identifier = identifier.to_string();
        self
    }

    pub fn stage(mut self, stage: &str) -> Self {
        self.node.stage = stage.to_string();
        self
    }

    pub fn build(mut self) -> GraphBuilder {
        self.graph_builder.nodes.push(self.node);
        self.graph_builder
    }
}
