use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use crate::controller::CanvasController;
use crate::events::CanvasEvent;
use crate::graph::{NodeId, NodeStatus};
use crate::resolver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nodes in the order they were animated
    Completed { visited: Vec<NodeId> },
    /// Another run was in flight; nothing happened
    AlreadyRunning,
}

/// Clears the running flag however the run ends (including the future being dropped).
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CanvasController {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Simulated run: every reachable node goes pending -> running -> completed
    /// in resolver order, one at a time.
    pub async fn run(&self) -> RunOutcome {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Run requested while another run is active, ignoring");
            return RunOutcome::AlreadyRunning;
        }
        let _guard = RunGuard(&self.running);

        let (order, missed) = {
            let mut session = self.session.write().await;
            session.graph.reset_statuses();
            (resolver::execution_order(&session.graph), resolver::unreachable(&session.graph))
        };
        if !missed.is_empty() {
            warn!(nodes = ?missed, "Nodes not reachable from any root will not run");
        }

        info!(steps = order.len(), "Pipeline run started");
        self.events.publish(CanvasEvent::RunStarted { order: order.clone() });

        for node_id in &order {
            self.set_status(node_id, NodeStatus::Running).await;
            sleep(self.step_delay).await;
            self.set_status(node_id, NodeStatus::Completed).await;
            debug!(node_id = %node_id, "Step completed");
        }

        info!(steps = order.len(), "Pipeline run finished");
        self.events.publish(CanvasEvent::RunFinished);
        RunOutcome::Completed { visited: order }
    }
}
