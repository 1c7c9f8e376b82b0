//! Module Registry handlers.
//!
//! ## Commands
//! - Saving a module (admin)
//!
//! ## Queries
//! - Modules visible to a user, with lock state
//! - Assistants available for binding (admin)

mod list_assistants;
mod list_modules;
mod save_module;

// Commands
pub use save_module::{SaveModuleCommand, SaveModuleHandler, SaveModuleResult};

// Queries
pub use list_assistants::ListAssistantsHandler;
pub use list_modules::{visible_modules, ListModulesHandler, ListModulesResult, ModuleAccessView};

pub(crate) use list_modules::fetch_registry;
