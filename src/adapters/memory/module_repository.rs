//! In-memory Module Registry.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ModuleId};
use crate::domain::module::Module;
use crate::ports::ModuleRepository;

/// Keeps modules ordered by id so `list` needs no sort.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModuleRepository {
    modules: Arc<RwLock<BTreeMap<ModuleId, Module>>>,
}

impl InMemoryModuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with `modules`.
    pub fn with_modules(modules: impl IntoIterator<Item = Module>) -> Self {
        let map = modules.into_iter().map(|m| (m.id.clone(), m)).collect();
        Self {
            modules: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl ModuleRepository for InMemoryModuleRepository {
    async fn list(&self) -> Result<Vec<Module>, DomainError> {
        Ok(self.modules.read().await.values().cloned().collect())
    }

    async fn find(&self, id: &ModuleId) -> Result<Option<Module>, DomainError> {
        Ok(self.modules.read().await.get(id).cloned())
    }

    async fn save(&self, module: &Module) -> Result<(), DomainError> {
        self.modules
            .write()
            .await
            .insert(module.id.clone(), module.clone());
        Ok(())
    }
}
