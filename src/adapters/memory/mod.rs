//! In-memory adapters for development and tests.

mod assistant_directory;
mod module_repository;
mod prescription_widget;
mod subscription_repository;

pub use assistant_directory::InMemoryAssistantDirectory;
pub use module_repository::InMemoryModuleRepository;
pub use prescription_widget::InMemoryPrescriptionWidget;
pub use subscription_repository::InMemorySubscriptionRepository;
