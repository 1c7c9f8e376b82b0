//! SaveModuleHandler - Admin edits to the Module Registry.

use std::sync::Arc;

use crate::domain::foundation::{AssistantId, ModuleId};
use crate::domain::module::Module;
use crate::domain::subscription::{ModuleTier, SubscriptionError};
use crate::ports::ModuleRepository;

#[derive(Debug, Clone)]
pub struct SaveModuleCommand {
    pub id: ModuleId,
    pub name: String,
    pub tier: ModuleTier,
    pub assistant_id: Option<AssistantId>,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SaveModuleResult {
    pub module: Module,
    pub created: bool,
}

pub struct SaveModuleHandler {
    modules: Arc<dyn ModuleRepository>,
}

impl SaveModuleHandler {
    pub fn new(modules: Arc<dyn ModuleRepository>) -> Self {
        Self { modules }
    }

    /// Creates or replaces a module after checking registry invariants.
    pub async fn handle(&self, cmd: SaveModuleCommand) -> Result<SaveModuleResult, SubscriptionError> {
        let module = Module {
            id: cmd.id,
            name: cmd.name.trim().to_string(),
            tier: cmd.tier,
            assistant_id: cmd.assistant_id.filter(|a| !a.is_blank()),
            enabled: cmd.enabled,
        };
        module.validate()?;

        let created = self.modules.find(&module.id).await?.is_none();
        self.modules.save(&module).await?;

        tracing::info!(
            module_id = %module.id,
            tier = %module.tier,
            enabled = module.enabled,
            created,
            "module saved"
        );
        Ok(SaveModuleResult { module, created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryModuleRepository;

    fn command(enabled: bool, assistant: Option<&str>) -> SaveModuleCommand {
        SaveModuleCommand {
            id: ModuleId::new("prescribe").unwrap(),
            name: "  Prescription helper ".to_string(),
            tier: ModuleTier::Pro,
            assistant_id: assistant.map(|a| AssistantId::new(a).unwrap()),
            enabled,
        }
    }

    #[tokio::test]
    async fn saves_new_module() {
        let repo = Arc::new(InMemoryModuleRepository::new());
        let handler = SaveModuleHandler::new(repo.clone());

        let result = handler.handle(command(true, Some("asst_rx"))).await.unwrap();

        assert!(result.created);
        assert_eq!(result.module.name, "Prescription helper");
        let stored = repo.find(&ModuleId::new("prescribe").unwrap()).await.unwrap();
        assert_eq!(stored, Some(result.module));
    }

    #[tokio::test]
    async fn second_save_updates() {
        let handler = SaveModuleHandler::new(Arc::new(InMemoryModuleRepository::new()));
        handler.handle(command(false, None)).await.unwrap();

        let result = handler.handle(command(true, Some("asst_rx"))).await.unwrap();
        assert!(!result.created);
        assert!(result.module.enabled);
    }

    #[tokio::test]
    async fn enabling_without_assistant_is_rejected() {
        let repo = Arc::new(InMemoryModuleRepository::new());
        let err = SaveModuleHandler::new(repo.clone())
            .handle(command(true, None))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::ValidationFailed { ref field, .. } if field == "assistant_id"));
        assert!(repo.list().await.unwrap().is_empty());
    }
}
