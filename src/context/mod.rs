//! Current account/enterprise selection, shared by every view in the process.
//!
//! One cache per process, explicit invalidation, and a broadcast channel that
//! breadcrumb/header/settings views subscribe to instead of polling.

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, trace, warn};
use crate::api::ApiClient;
use crate::api::directory::{Account, CurrentContext, Enterprise};
use crate::error::NetworkError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEvent {
    Changed(CurrentContext),
    Invalidated,
}

/// Backend calls the cache needs. Implemented by [`ApiClient`].
#[async_trait]
pub trait ContextSource: Send + Sync {
    async fn fetch_context(&self) -> Result<Option<CurrentContext>, NetworkError>;
    async fn store_context(&self, context: &CurrentContext) -> Result<(), NetworkError>;
    async fn accounts(&self) -> Result<Vec<Account>, NetworkError>;
    async fn enterprises(&self) -> Result<Vec<Enterprise>, NetworkError>;
    async fn entities(&self, enterprise_id: &str) -> Result<Vec<String>, NetworkError>;
}

#[async_trait]
impl ContextSource for ApiClient {
    async fn fetch_context(&self) -> Result<Option<CurrentContext>, NetworkError> {
        self.get_current_context().await
    }

    async fn store_context(&self, context: &CurrentContext) -> Result<(), NetworkError> {
        self.save_current_context(context).await
    }

    async fn accounts(&self) -> Result<Vec<Account>, NetworkError> {
        self.list_accounts().await
    }

    async fn enterprises(&self) -> Result<Vec<Enterprise>, NetworkError> {
        self.list_enterprises().await
    }

    async fn entities(&self, enterprise_id: &str) -> Result<Vec<String>, NetworkError> {
        self.list_entities(enterprise_id).await
    }
}

enum Cached {
    Unloaded,
    Loaded(Option<CurrentContext>),
}

pub struct ContextCache {
    source: Arc<dyn ContextSource>,
    current: RwLock<Cached>,
    events: broadcast::Sender<ContextEvent>,
}

impl ContextCache {
    pub fn new(source: Arc<dyn ContextSource>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            source,
            current: RwLock::new(Cached::Unloaded),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContextEvent> {
        self.events.subscribe()
    }

    /// Cached selection, fetched on first use. A failed fetch is not cached.
    pub async fn get(&self) -> Option<CurrentContext> {
        if let Cached::Loaded(ctx) = &*self.current.read().await {
            return ctx.clone();
        }

        // Held across the fetch so a concurrent set/invalidate lands after it.
        let mut current = self.current.write().await;
        if let Cached::Loaded(ctx) = &*current {
            return ctx.clone();
        }

        match self.source.fetch_context().await {
            Ok(ctx) => {
                *current = Cached::Loaded(ctx.clone());
                ctx
            }
            Err(e) => {
                warn!(error = %e, "Failed to load current context");
                None
            }
        }
    }

    /// Applies the selection locally and notifies subscribers even when the
    /// backend write fails; the failure is only logged.
    pub async fn set(&self, context: CurrentContext) {
        if let Err(e) = self.source.store_context(&context).await {
            warn!(error = %e, account_id = %context.account_id, "Failed to persist current context");
        }
        *self.current.write().await = Cached::Loaded(Some(context.clone()));
        info!(account_id = %context.account_id, enterprise_id = %context.enterprise_id, "Context changed");
        self.publish(ContextEvent::Changed(context));
    }

    pub async fn invalidate(&self) {
        *self.current.write().await = Cached::Unloaded;
        self.publish(ContextEvent::Invalidated);
    }

    fn publish(&self, event: ContextEvent) {
        if let Err(e) = self.events.send(event) {
            trace!("Dropped context event: {:?}", e.0);
        }
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.source.accounts().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load accounts");
            Vec::new()
        })
    }

    pub async fn enterprises(&self) -> Vec<Enterprise> {
        self.source.enterprises().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load enterprises");
            Vec::new()
        })
    }

    pub async fn entities(&self, enterprise_id: &str) -> Vec<String> {
        self.source.entities(enterprise_id).await.unwrap_or_else(|e| {
            warn!(error = %e, enterprise_id = %enterprise_id, "Failed to load entities");
            Vec::new()
        })
    }
}
