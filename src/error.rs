//! Error types shared across the canvas core.
//!
//! Decode and network failures are expected to be caught at the call site
//! and turned into a safe default; validation errors are meant to be shown
//! next to the offending field.

use thiserror::Error;

/// The serialized pipeline text could not be turned back into a graph.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("pipeline document is empty")]
    Empty,

    #[error("malformed pipeline document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported pipeline document version: {0}")]
    UnsupportedVersion(u32),

    #[error("failed to access pipeline file: {0}")]
    Io(#[from] std::io::Error),
}

/// A Template Store or directory call failed.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("failed to encode payload: {0}")]
    Codec(String),
}

impl NetworkError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Form-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level error returned by controller operations the user explicitly
/// asked for (save, delete, copy).
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("template not found: {0}")]
    NotFound(String),
}

pub type Result<T, E = CanvasError> = std::result::Result<T, E>;
