//! Module Registry persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ModuleId};
use crate::domain::module::Module;

#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// All modules, enabled or not, ordered by id.
    async fn list(&self) -> Result<Vec<Module>, DomainError>;

    async fn find(&self, id: &ModuleId) -> Result<Option<Module>, DomainError>;

    /// Inserts or replaces a module.
    ///
    /// Callers validate the module first; implementations store it as given.
    async fn save(&self, module: &Module) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ModuleRepository) {}
    }
}
