//! Module Registry domain.
//!
//! A module is a user-facing feature (an AI assistant specialised for one
//! task) tagged with the minimum subscription tier needed to use it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AssistantId, ModuleId, ValidationError};
use crate::domain::subscription::ModuleTier;

/// A feature module in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub tier: ModuleTier,
    #[serde(default)]
    pub assistant_id: Option<AssistantId>,
    #[serde(default)]
    pub enabled: bool,
}

impl Module {
    /// Creates a disabled, unlinked module.
    pub fn new(id: ModuleId, name: impl Into<String>, tier: ModuleTier) -> Self {
        Self {
            id,
            name: name.into(),
            tier,
            assistant_id: None,
            enabled: false,
        }
    }

    pub fn linked_to(mut self, assistant_id: AssistantId) -> Self {
        self.assistant_id = Some(assistant_id);
        self
    }

    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// True when an assistant with a non-blank id is bound.
    pub fn is_linked(&self) -> bool {
        self.assistant_id
            .as_ref()
            .map(|a| !a.is_blank())
            .unwrap_or(false)
    }

    /// Checks the registry invariants before a save.
    ///
    /// # Errors
    ///
    /// - `EmptyField("name")` for a blank name
    /// - `InvalidFormat("assistant_id")` when enabled without a linked assistant
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.enabled && !self.is_linked() {
            return Err(ValidationError::invalid_format(
                "assistant_id",
                "an enabled module must be linked to an assistant",
            ));
        }
        Ok(())
    }
}
