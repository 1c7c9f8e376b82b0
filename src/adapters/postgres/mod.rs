//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Per-user subscription records
//! - `PostgresModuleRepository` - Module Registry

mod module_repository;
mod subscription_repository;

pub use module_repository::PostgresModuleRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
