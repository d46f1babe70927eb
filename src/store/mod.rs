pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::error::NetworkError;
use crate::graph::PipelineMetadata;

pub use memory::InMemoryTemplateStore;
pub use redis_store::RedisTemplateStore;

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_ARCHIVED: &str = "archived";

/// Listing record for a template. Dashboards read these without fetching YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enterprise: String,
    #[serde(default)]
    pub entity: String,
    #[serde(default)]
    pub deployment_type: String,
    #[serde(default = "default_status")]
    pub status: String,
    pub creation_date: DateTime<Utc>,
}

fn default_status() -> String {
    STATUS_DRAFT.to_string()
}

impl TemplateRecord {
    pub fn from_metadata(id: impl Into<String>, metadata: &PipelineMetadata, status: &str, creation_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            enterprise: metadata.enterprise.clone(),
            entity: metadata.entity.clone(),
            deployment_type: metadata.deployment_type.clone(),
            status: status.to_string(),
            creation_date,
        }
    }
}

// --- Interfaces ---

/// The external template store: listing records plus the YAML body per template id.
///
/// No locking or versioning; concurrent writers to the same id are last-write-wins.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError>;

    /// Returns the record as stored (the backend may assign its own id).
    async fn create_template(&self, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError>;

    /// Fails with a 404 `NetworkError::Api` when no record has this id.
    async fn update_template(&self, id: &str, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError>;

    async fn delete_template(&self, id: &str) -> Result<(), NetworkError>;

    /// `Ok(None)` when nothing was ever saved for the id.
    async fn load_yaml(&self, id: &str) -> Result<Option<String>, NetworkError>;

    async fn save_yaml(&self, id: &str, yaml: &str) -> Result<(), NetworkError>;
}
