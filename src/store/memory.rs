use async_trait::async_trait;
use dashmap::DashMap;
use crate::error::NetworkError;
use crate::store::{TemplateRecord, TemplateStore};

/// Process-local store, used by tests and the CLI's offline commands.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    records: DashMap<String, TemplateRecord>,
    // Map<TemplateID, YAML>
    yaml: DashMap<String, String>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds YAML for an id without a listing record (e.g. a corrupt legacy body).
    pub fn insert_yaml(&self, id: &str, yaml: &str) {
        self.yaml.insert(id.to_string(), yaml.to_string());
    }

    pub fn record(&self, id: &str) -> Option<TemplateRecord> {
        self.records.get(id).map(|r| r.value().clone())
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError> {
        let mut records: Vec<TemplateRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.creation_date.cmp(&b.creation_date).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn create_template(&self, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(record.clone())
    }

    async fn update_template(&self, id: &str, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        match self.records.get_mut(id) {
            Some(mut existing) => {
                let mut updated = record.clone();
                updated.id = id.to_string();
                updated.creation_date = existing.creation_date;
                *existing = updated.clone();
                Ok(updated)
            }
            None => Err(NetworkError::api(404, format!("template {} not found", id))),
        }
    }

    async fn delete_template(&self, id: &str) -> Result<(), NetworkError> {
        let removed = self.records.remove(id).is_some();
        let removed_yaml = self.yaml.remove(id).is_some();
        if removed || removed_yaml {
            Ok(())
        } else {
            Err(NetworkError::api(404, format!("template {} not found", id)))
        }
    }

    async fn load_yaml(&self, id: &str) -> Result<Option<String>, NetworkError> {
        Ok(self.yaml.get(id).map(|v| v.value().clone()))
    }

    async fn save_yaml(&self, id: &str, yaml: &str) -> Result<(), NetworkError> {
        self.yaml.insert(id.to_string(), yaml.to_string());
        Ok(())
    }
}
