//! ListAssistantsHandler - Assistants an admin can bind to a module.

use std::sync::Arc;

use crate::domain::subscription::SubscriptionError;
use crate::ports::{AssistantDirectory, AssistantSummary};

pub struct ListAssistantsHandler {
    directory: Arc<dyn AssistantDirectory>,
}

impl ListAssistantsHandler {
    pub fn new(directory: Arc<dyn AssistantDirectory>) -> Self {
        Self { directory }
    }

    /// Directory entries sorted by display name.
    pub async fn handle(&self) -> Result<Vec<AssistantSummary>, SubscriptionError> {
        let mut assistants = self.directory.list_assistants().await.map_err(|e| {
            tracing::error!(error = %e, "assistant directory request failed");
            SubscriptionError::infrastructure(e.to_string())
        })?;
        assistants.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(assistants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AssistantId;
    use crate::ports::DirectoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockDirectory {
        response: Mutex<Option<Result<Vec<AssistantSummary>, DirectoryError>>>,
    }

    impl MockDirectory {
        fn returning(response: Result<Vec<AssistantSummary>, DirectoryError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
            }
        }
    }

    #[async_trait]
    impl AssistantDirectory for MockDirectory {
        async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, DirectoryError> {
            self.response
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn summary(id: &str, name: &str) -> AssistantSummary {
        AssistantSummary {
            id: AssistantId::new(id).unwrap(),
            name: name.to_string(),
            model: None,
        }
    }

    #[tokio::test]
    async fn sorts_by_name() {
        let handler = ListAssistantsHandler::new(Arc::new(MockDirectory::returning(Ok(vec![
            summary("asst_2", "triage"),
            summary("asst_1", "Anamnesis"),
        ]))));

        let names: Vec<_> = handler
            .handle()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Anamnesis", "triage"]);
    }

    #[tokio::test]
    async fn directory_failure_is_infrastructure_error() {
        let handler = ListAssistantsHandler::new(Arc::new(MockDirectory::returning(Err(
            DirectoryError::AuthenticationFailed,
        ))));

        let err = handler.handle().await.unwrap_err();
        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
    }
}
