//! HTTP client for the backend API (`<base>/api/...`).
//!
//! Templates, the pipeline YAML store, and the account/enterprise directory
//! all go through one [`ApiClient`]. Endpoint groups live in submodules.

pub mod directory;
pub mod templates;

use std::time::Duration;
use reqwest::Client;
use serde::de::DeserializeOwned;
use crate::config::CanvasConfig;
use crate::error::NetworkError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    /// e.g. "http://localhost:8080"; paths are appended as "/api/..."
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(config.api_base_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    // --- Response handlers ---

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, NetworkError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NetworkError::api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| NetworkError::Parse(format!("Failed to parse JSON response: {}", e)))
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), NetworkError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NetworkError::api(status.as_u16(), error_text));
        }

        Ok(())
    }
}
