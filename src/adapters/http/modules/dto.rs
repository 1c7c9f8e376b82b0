//! HTTP DTOs for Module Registry endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::module::{ListModulesResult, ModuleAccessView};
use crate::domain::subscription::ModuleTier;
use crate::ports::AssistantSummary;

/// Body of `PUT /api/admin/modules/:id`. The id comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveModuleRequest {
    pub name: String,
    pub tier: ModuleTier,
    /// Blank or missing unlinks the module.
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleListResponse {
    pub modules: Vec<ModuleAccessView>,
    /// True when the list was built from cached or default data.
    pub degraded: bool,
}

impl From<ListModulesResult> for ModuleListResponse {
    fn from(result: ListModulesResult) -> Self {
        Self {
            modules: result.modules,
            degraded: result.degraded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantListResponse {
    pub assistants: Vec<AssistantSummary>,
}
