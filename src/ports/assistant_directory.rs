//! AI assistant directory port.
//!
//! Lists the assistant configurations an operator can bind to a module. Only
//! the admin Module Registry editor reads it; access checks never do.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{AssistantId, DomainError, ErrorCode};

#[async_trait]
pub trait AssistantDirectory: Send + Sync {
    /// Every assistant visible to the configured API key.
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, DirectoryError>;
}

/// One entry of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSummary {
    pub id: AssistantId,

    /// Display name; falls back to the id when the directory has none.
    pub name: String,

    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited")]
    RateLimited,

    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<DirectoryError> for DomainError {
    fn from(err: DirectoryError) -> Self {
        DomainError::new(ErrorCode::AssistantDirectoryError, err.to_string())
    }
}
