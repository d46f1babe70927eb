use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Serialize, Deserialize};
use crate::factory::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
use crate::graph::GridLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

impl IdStrategy {
    pub fn generator(self) -> Arc<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Arc::new(UuidIdGenerator),
            IdStrategy::Sequential => Arc::new(SequentialIdGenerator::random_session()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Simulated duration of one node during a run
    pub run_step_delay_ms: u64,
    pub layout: GridLayout,
    pub id_strategy: IdStrategy,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 30,
            run_step_delay_ms: 800,
            layout: GridLayout::default(),
            id_strategy: IdStrategy::Uuid,
        }
    }
}

impl CanvasConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file from {}", path.display()))?;
        let config: CanvasConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to deserialize config from {}", path.display()))?;
        Ok(config)
    }

    pub fn run_step_delay(&self) -> Duration {
        Duration::from_millis(self.run_step_delay_ms)
    }
}
