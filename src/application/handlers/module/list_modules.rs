//! ListModulesHandler - Module Registry views.
//!
//! Users see the enabled modules, each marked locked or unlocked for their
//! plan. Administrators see the whole registry.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::application::fallback::{fetch_with_fallback, Fetched, SubscriptionStateCache};
use crate::domain::foundation::{DomainError, ModuleId, UserId};
use crate::domain::module::Module;
use crate::domain::subscription::{
    check_module_access, AccessDeniedReason, ModuleTier, UserSubscriptionState,
};
use crate::ports::{ModuleRepository, SubscriptionRepository};

/// A module as one user sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAccessView {
    pub id: ModuleId,
    pub name: String,
    pub tier: ModuleTier,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<AccessDeniedReason>,
}

/// Enabled modules in registry order, each with its access verdict.
pub fn visible_modules(
    state: Option<&UserSubscriptionState>,
    modules: &[Module],
) -> Vec<ModuleAccessView> {
    modules
        .iter()
        .filter(|m| m.enabled)
        .map(|module| {
            let denial = check_module_access(state, module).denial();
            ModuleAccessView {
                id: module.id.clone(),
                name: module.name.clone(),
                tier: module.tier,
                unlocked: denial.is_none(),
                denial,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ListModulesResult {
    pub modules: Vec<ModuleAccessView>,
    /// True when either read was served from a fallback.
    pub degraded: bool,
}

pub struct ListModulesHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    modules: Arc<dyn ModuleRepository>,
    cache: SubscriptionStateCache,
    fetch_timeout: Duration,
}

impl ListModulesHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        modules: Arc<dyn ModuleRepository>,
        cache: SubscriptionStateCache,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            subscriptions,
            modules,
            cache,
            fetch_timeout,
        }
    }

    /// Never fails: store problems degrade to cached or default data.
    pub async fn handle(&self, user_id: &UserId) -> ListModulesResult {
        let state = self
            .cache
            .read_through(self.subscriptions.as_ref(), user_id, self.fetch_timeout)
            .await;
        let registry = fetch_registry(self.modules.as_ref(), self.fetch_timeout).await;

        let degraded = state.is_fallback() || registry.is_fallback();
        if degraded {
            tracing::warn!(user_id = %user_id, "module list served from fallback");
        }

        ListModulesResult {
            modules: visible_modules(state.value().as_ref(), registry.value()),
            degraded,
        }
    }

    /// Every registry entry, enabled or not.
    pub async fn handle_admin(&self) -> Result<Vec<Module>, DomainError> {
        self.modules.list().await
    }
}

/// Reads the registry with the same fallback rules as the status query.
pub(crate) async fn fetch_registry(
    modules: &dyn ModuleRepository,
    timeout: Duration,
) -> Fetched<Vec<Module>> {
    fetch_with_fallback(modules.list(), timeout, Vec::new).await
}
