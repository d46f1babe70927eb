use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use tracing::debug;
use crate::api::ApiClient;
use crate::error::NetworkError;
use crate::store::{TemplateRecord, TemplateStore};

/// Body of `/api/pipeline-yaml/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YamlPayload {
    template_id: String,
    #[serde(default)]
    yaml: Option<String>,
}

#[async_trait]
impl TemplateStore for ApiClient {
    async fn list_templates(&self) -> Result<Vec<TemplateRecord>, NetworkError> {
        let response = self.client.get(self.url("/templates")).send().await?;
        self.handle_response(response).await
    }

    async fn create_template(&self, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        let response = self.client.post(self.url("/templates")).json(record).send().await?;
        self.handle_response(response).await
    }

    async fn update_template(&self, id: &str, record: &TemplateRecord) -> Result<TemplateRecord, NetworkError> {
        let url = self.url(&format!("/templates/{}", id));
        let response = self.client.put(&url).json(record).send().await?;
        self.handle_response(response).await
    }

    async fn delete_template(&self, id: &str) -> Result<(), NetworkError> {
        let url = self.url(&format!("/templates/{}", id));
        let response = self.client.delete(&url).send().await?;
        self.handle_empty_response(response).await
    }

    async fn load_yaml(&self, id: &str) -> Result<Option<String>, NetworkError> {
        let url = self.url(&format!("/pipeline-yaml/{}", id));
        let response = self.client.get(&url).send().await?;
        match self.handle_response::<YamlPayload>(response).await {
            Ok(payload) => Ok(payload.yaml.filter(|y| !y.trim().is_empty())),
            Err(e) if e.is_not_found() => {
                debug!(template_id = %id, "No stored YAML");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn save_yaml(&self, id: &str, yaml: &str) -> Result<(), NetworkError> {
        let url = self.url(&format!("/pipeline-yaml/{}", id));
        let payload = YamlPayload {
            template_id: id.to_string(),
            yaml: Some(yaml.to_string()),
        };
        let response = self.client.put(&url).json(&payload).send().await?;
        self.handle_empty_response(response).await
    }
}
