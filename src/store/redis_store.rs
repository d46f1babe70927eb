use async_trait::async_trait;
use redis::AsyncCommands;
use std::collections::HashMap;
use tracing::warn;
use crate::error::NetworkError;
use crate::store::{TemplateRecord, TemplateStore};

/// Template store backed by Redis.
///
/// Records live in one hash (`<prefix>:templates`, field = template id, value =
/// JSON record); each YAML body is a plain string key `<prefix>:yaml:<id>`.
pub struct RedisTemplateStore {
    client: redis::Client,
    prefix: String,
}

impl RedisTemplateStore {
    pub fn new(client: redis::Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }

    fn records_key(&self) -> String {
        format!("{}:templates", self.prefix)
    }

    fn yaml_key(&self, id: &str) -> String {
        format!("{}:yaml:{}", self.prefix, id)
    }

    fn to_json(record: &TemplateRecord) -> Result<String, NetworkError> {
        serde_json::to_string(record).map_err(|e| NetworkError::Codec(e.to_string()))
    }
}

#[async_trait]
impl TemplateStore for RedisTemplateStore {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: HashMap<String, String> = conn.hgetall(self.records_key()).await?;

        let mut records = Vec::with_capacity(raw.len());
        for (id, json) in raw {
            match serde_json::from_str::<TemplateRecord>(&json) {
                Ok(record) => records.push(record),
                Err(e) => warn!(template_id = %id, error = %e, "Skipping unreadable template record"),
            }
        }
        records.sort_by(|a, b| a.creation_date.cmp(&b.creation_date).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn create_template(&self, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.hset(self.records_key(), &record.id, Self::to_json(record)?).await?;
        Ok(record.clone())
    }

    async fn update_template(&self, id: &str, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let existing: Option<String> = conn.hget(self.records_key(), id).await?;
        let Some(existing) = existing else {
            return Err(NetworkError::api(404, format!("template {} not found", id)));
        };

        let mut updated = record.clone();
        updated.id = id.to_string();
        // Creation date belongs to the first save.
        if let Ok(previous) = serde_json::from_str::<TemplateRecord>(&existing) {
            updated.creation_date = previous.creation_date;
        }
        let _: () = conn.hset(self.records_key(), id, Self::to_json(&updated)?).await?;
        Ok(updated)
    }

    async fn delete_template(&self, id: &str) -> Result<(), NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let records: usize = conn.hdel(self.records_key(), id).await?;
        let bodies: usize = conn.del(self.yaml_key(id)).await?;
        if records + bodies == 0 {
            return Err(NetworkError::api(404, format!("template {} not found", id)));
        }
        Ok(())
    }

    async fn load_yaml(&self, id: &str) -> Result<Option<String>, NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let yaml: Option<String> = conn.get(self.yaml_key(id)).await?;
        Ok(yaml)
    }

    async fn save_yaml(&self, id: &str, yaml: &str) -> Result<(), NetworkError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(self.yaml_key(id), yaml).await?;
        Ok(())
    }
}
