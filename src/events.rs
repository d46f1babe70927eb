use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{trace, warn};
use crate::graph::{NodeId, NodeStatus};

/// Notifications for the view layer. The canvas redraws from the controller's
/// snapshot when it sees one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Node or edge list was replaced
    GraphChanged { nodes: usize, edges: usize },
    MetadataChanged,
    NodeStatusChanged { node_id: NodeId, status: NodeStatus },
    /// Ask the rendering surface to fit all nodes into view
    FitView,
    RunStarted { order: Vec<NodeId> },
    RunFinished,
    TemplateLoaded { template_id: String },
    TemplateSaved { template_id: String },
    TemplateDeleted { template_id: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CanvasEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: CanvasEvent) {
        // No subscribers is fine; the canvas may not be mounted.
        if let Err(e) = self.sender.send(event) {
            trace!("Dropped canvas event: {:?}", e.0);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CanvasEvent> {
        self.sender.subscribe()
    }
}

/// Next event for a subscriber. A lagging receiver skips what it missed and
/// keeps going; `None` only once the bus is gone.
pub async fn next_event(receiver: &mut broadcast::Receiver<CanvasEvent>) -> Option<CanvasEvent> {
    loop {
        match receiver.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Canvas event subscriber fell behind");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
