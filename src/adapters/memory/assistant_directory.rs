//! In-memory assistant directory.
//!
//! A fixed list, used when no OpenAI key is configured and in tests.

use async_trait::async_trait;

use crate::ports::{AssistantDirectory, AssistantSummary, DirectoryError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryAssistantDirectory {
    assistants: Vec<AssistantSummary>,
}

impl InMemoryAssistantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assistants(assistants: Vec<AssistantSummary>) -> Self {
        Self { assistants }
    }
}

#[async_trait]
impl AssistantDirectory for InMemoryAssistantDirectory {
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, DirectoryError> {
        Ok(self.assistants.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AssistantId;

    #[tokio::test]
    async fn returns_configured_assistants() {
        let directory = InMemoryAssistantDirectory::with_assistants(vec![AssistantSummary {
            id: AssistantId::new("asst_1").unwrap(),
            name: "Triage".to_string(),
            model: Some("gpt-4o".to_string()),
        }]);

        let listed = directory.list_assistants().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Triage");
    }

    #[tokio::test]
    async fn empty_by_default() {
        assert!(InMemoryAssistantDirectory::new().list_assistants().await.unwrap().is_empty());
    }
}
