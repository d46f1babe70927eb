//! Editing session orchestration.
//!
//! The controller is the only owner of the live graph. Palette, canvas and
//! header code call into it with intents (drop, connect, field edit, save) and
//! redraw from [`CanvasController::graph`] when a [`CanvasEvent`] arrives.
//! Every mutation happens under one write lock, so no half-applied node or
//! edge list is ever observable.

mod run;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use crate::codec;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result, ValidationError};
use crate::events::{CanvasEvent, EventBus};
use crate::factory::{DragPayload, IdGenerator, NodeFactory, Projection, ScreenPoint};
use crate::flows;
use crate::graph::{Edge, EdgeId, Graph, GridLayout, NodeId, NodeStatus, PipelineMetadata};
use crate::store::{TemplateRecord, TemplateStore, STATUS_ACTIVE};

pub use run::RunOutcome;

/// Where [`CanvasController::load`] got the graph from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    BuiltIn,
    Empty,
}

#[derive(Debug, Clone, Default)]
struct Session {
    graph: Graph,
    metadata: PipelineMetadata,
    /// `None` until the pipeline has been saved (or after a copy)
    template_id: Option<String>,
}

pub struct CanvasController {
    store: Arc<dyn TemplateStore>,
    ids: Arc<dyn IdGenerator>,
    factory: NodeFactory,
    layout: GridLayout,
    step_delay: Duration,
    session: RwLock<Session>,
    running: AtomicBool,
    events: EventBus,
}

impl CanvasController {
    pub fn new(store: Arc<dyn TemplateStore>, config: &CanvasConfig) -> Self {
        Self::with_id_generator(store, config, config.id_strategy.generator())
    }

    pub fn with_id_generator(store: Arc<dyn TemplateStore>, config: &CanvasConfig, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store,
            factory: NodeFactory::new(ids.clone()),
            ids,
            layout: config.layout,
            step_delay: config.run_step_delay(),
            session: RwLock::new(Session::default()),
            running: AtomicBool::new(false),
            events: EventBus::default(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // --- Snapshots ---

    pub async fn graph(&self) -> Graph {
        self.session.read().await.graph.clone()
    }

    pub async fn metadata(&self) -> PipelineMetadata {
        self.session.read().await.metadata.clone()
    }

    pub async fn template_id(&self) -> Option<String> {
        self.session.read().await.template_id.clone()
    }

    // --- Session lifecycle ---

    /// Starts a fresh, unsaved pipeline.
    pub async fn new_pipeline(&self, name: &str) {
        self.replace_session(Session {
            graph: Graph::new(),
            metadata: PipelineMetadata::named(name),
            template_id: None,
        })
        .await;
    }

    /// Replaces the whole session, e.g. with a pipeline read from a local file.
    pub async fn open(&self, graph: Graph, metadata: PipelineMetadata, template_id: Option<String>) {
        self.replace_session(Session {
            graph,
            metadata,
            template_id,
        })
        .await;
    }

    /// Loads a template by id. Never fails: a missing or corrupt stored
    /// document falls back to the built-in flow for the id, then to an empty graph.
    pub async fn load(&self, template_id: &str) -> LoadSource {
        let stored = match self.store.load_yaml(template_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!(template_id = %template_id, error = %e, "Failed to fetch pipeline YAML");
                None
            }
        };

        let decoded = match stored.as_deref().map(codec::decode) {
            Some(Ok(pair)) => Some(pair),
            Some(Err(e)) => {
                warn!(template_id = %template_id, error = %e, "Stored pipeline YAML did not decode, falling back");
                None
            }
            None => None,
        };

        let (graph, metadata, source) = match decoded {
            Some((graph, metadata)) => (graph, metadata, LoadSource::Stored),
            None => match flows::builtin_flow(template_id) {
                Some((graph, metadata)) => (graph, metadata, LoadSource::BuiltIn),
                None => (Graph::new(), PipelineMetadata::default(), LoadSource::Empty),
            },
        };

        for issue in graph.validate() {
            warn!(template_id = %template_id, "Loaded graph: {}", issue);
        }
        info!(template_id = %template_id, source = ?source, nodes = graph.nodes.len(), edges = graph.edges.len(), "Template loaded");

        self.replace_session(Session {
            graph,
            metadata,
            template_id: Some(template_id.to_string()),
        })
        .await;
        self.events.publish(CanvasEvent::TemplateLoaded { template_id: template_id.to_string() });
        source
    }

    /// Saves over the current template, or behaves like [`save_as`](Self::save_as)
    /// when the pipeline has never been saved.
    pub async fn save(&self) -> Result<String> {
        let (graph, metadata, template_id) = self.snapshot().await;
        let Some(template_id) = template_id else {
            return self.save_as().await;
        };
        validate_metadata(&metadata)?;

        let yaml = codec::encode(&graph, &metadata)?;
        self.store.save_yaml(&template_id, &yaml).await?;

        let record = TemplateRecord::from_metadata(&template_id, &metadata, STATUS_ACTIVE, Utc::now());
        match self.store.update_template(&template_id, &record).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                debug!(template_id = %template_id, "No listing record yet, creating one");
                self.store.create_template(&record).await?;
            }
            Err(e) => return Err(e.into()),
        }

        info!(template_id = %template_id, name = %metadata.name, "Template saved");
        self.events.publish(CanvasEvent::TemplateSaved { template_id: template_id.clone() });
        Ok(template_id)
    }

    /// Saves under a freshly minted template id and makes it the current one.
    pub async fn save_as(&self) -> Result<String> {
        let (graph, metadata, _) = self.snapshot().await;
        validate_metadata(&metadata)?;
        let yaml = codec::encode(&graph, &metadata)?;

        let minted = self.ids.next_id("template");
        let record = TemplateRecord::from_metadata(minted, &metadata, STATUS_ACTIVE, Utc::now());
        let created = self.store.create_template(&record).await?;
        // Adopt the id before writing the body so a retry updates this record.
        self.session.write().await.template_id = Some(created.id.clone());
        if let Err(e) = self.store.save_yaml(&created.id, &yaml).await {
            warn!(template_id = %created.id, error = %e, "Template record created but YAML save failed");
            return Err(e.into());
        }

        info!(template_id = %created.id, name = %metadata.name, "Template created");
        self.events.publish(CanvasEvent::TemplateSaved { template_id: created.id.clone() });
        Ok(created.id)
    }

    /// Replaces the session with a renamed copy of another template. The copy
    /// has no template id, so the next save creates a new record.
    pub async fn copy_from_template(&self, source_id: &str) -> Result<()> {
        let stored = match self.store.load_yaml(source_id).await {
            Ok(text) => text,
            Err(e) => {
                warn!(template_id = %source_id, error = %e, "Failed to fetch pipeline YAML for copy");
                None
            }
        };

        let decoded = stored.as_deref()
            .and_then(|text| match codec::decode(text) {
                Ok(pair) => Some(pair),
                Err(e) => {
                    warn!(template_id = %source_id, error = %e, "Copy source did not decode");
                    None
                }
            })
            .or_else(|| flows::builtin_flow(source_id));

        let (graph, mut metadata) = decoded.ok_or_else(|| CanvasError::NotFound(source_id.to_string()))?;
        metadata.name = format!("{} (Copy)", metadata.name);
        info!(template_id = %source_id, name = %metadata.name, "Copied template");

        self.replace_session(Session {
            graph,
            metadata,
            template_id: None,
        })
        .await;
        Ok(())
    }

    pub async fn delete_template(&self, template_id: &str) -> Result<()> {
        self.store.delete_template(template_id).await?;

        let mut session = self.session.write().await;
        if session.template_id.as_deref() == Some(template_id) {
            session.template_id = None;
        }
        drop(session);

        info!(template_id = %template_id, "Template deleted");
        self.events.publish(CanvasEvent::TemplateDeleted { template_id: template_id.to_string() });
        Ok(())
    }

    /// Listing for dashboards; empty when the store is unreachable.
    pub async fn list_templates(&self) -> Vec<TemplateRecord> {
        self.store.list_templates().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list templates");
            Vec::new()
        })
    }

    // --- Canvas intents ---

    /// Swaps in a new node and edge list in one step.
    pub async fn replace_graph(&self, graph: Graph) {
        self.mutate_graph(|current| *current = graph).await;
    }

    pub async fn drop_node(&self, payload: &DragPayload, drop_point: ScreenPoint, projection: &(dyn Projection + Sync)) -> NodeId {
        let node = self.factory.create(payload, drop_point, projection);
        let id = node.id.clone();
        debug!(node_id = %id, kind = %node.kind, "Node dropped");
        self.mutate_graph(|graph| graph.add_node(node)).await;
        id
    }

    /// Endpoints are not checked; the canvas only offers existing handles.
    pub async fn connect(&self, source: &str, target: &str) -> EdgeId {
        let edge = Edge::new(self.ids.next_id("edge"), source, target);
        let id = edge.id.clone();
        self.mutate_graph(|graph| graph.add_edge(edge)).await;
        id
    }

    pub async fn delete_node(&self, node_id: &str) -> bool {
        self.mutate_graph(|graph| graph.remove_node(node_id).is_some()).await
    }

    pub async fn delete_edge(&self, edge_id: &str) -> bool {
        self.mutate_graph(|graph| graph.remove_edge(edge_id).is_some()).await
    }

    /// Manual status toggle; returns the new status, or `None` for an unknown node.
    pub async fn cycle_status(&self, node_id: &str) -> Option<NodeStatus> {
        let next = {
            let mut session = self.session.write().await;
            let next = session.graph.node(node_id)?.status.next();
            session.graph.update_node_status(node_id, next);
            next
        };
        self.events.publish(CanvasEvent::NodeStatusChanged { node_id: node_id.to_string(), status: next });
        Some(next)
    }

    /// Grid auto-layout, then fit the view.
    pub async fn format_canvas(&self) {
        let layout = self.layout;
        self.mutate_graph(|graph| graph.reposition_all(|node, idx| layout.place(node, idx))).await;
        self.events.publish(CanvasEvent::FitView);
    }

    // --- Header fields ---

    pub async fn update_metadata<F>(&self, update: F)
    where
        F: FnOnce(&mut PipelineMetadata),
    {
        update(&mut self.session.write().await.metadata);
        self.events.publish(CanvasEvent::MetadataChanged);
    }

    pub async fn set_name(&self, name: &str) {
        self.update_metadata(|m| m.name = name.to_string()).await;
    }

    pub async fn set_description(&self, description: &str) {
        self.update_metadata(|m| m.description = description.to_string()).await;
    }

    pub async fn set_enterprise(&self, enterprise: &str) {
        self.update_metadata(|m| m.enterprise = enterprise.to_string()).await;
    }

    pub async fn set_entity(&self, entity: &str) {
        self.update_metadata(|m| m.entity = entity.to_string()).await;
    }

    pub async fn set_deployment_type(&self, deployment_type: &str) {
        self.update_metadata(|m| m.deployment_type = deployment_type.to_string()).await;
    }

    // --- Internals ---

    async fn snapshot(&self) -> (Graph, PipelineMetadata, Option<String>) {
        let session = self.session.read().await;
        (session.graph.clone(), session.metadata.clone(), session.template_id.clone())
    }

    async fn replace_session(&self, session: Session) {
        let (nodes, edges) = (session.graph.nodes.len(), session.graph.edges.len());
        *self.session.write().await = session;
        self.events.publish(CanvasEvent::GraphChanged { nodes, edges });
        self.events.publish(CanvasEvent::MetadataChanged);
    }

    async fn mutate_graph<T, F>(&self, mutate: F) -> T
    where
        F: FnOnce(&mut Graph) -> T,
    {
        let (out, nodes, edges) = {
            let mut session = self.session.write().await;
            let out = mutate(&mut session.graph);
            (out, session.graph.nodes.len(), session.graph.edges.len())
        };
        self.events.publish(CanvasEvent::GraphChanged { nodes, edges });
        out
    }

    async fn set_status(&self, node_id: &str, status: NodeStatus) {
        let changed = self.session.write().await.graph.update_node_status(node_id, status);
        if changed {
            self.events.publish(CanvasEvent::NodeStatusChanged { node_id: node_id.to_string(), status });
        }
    }
}

fn validate_metadata(metadata: &PipelineMetadata) -> Result<(), ValidationError> {
    if metadata.name.trim().is_empty() {
        return Err(ValidationError::MissingField("template name"));
    }
    Ok(())
}
