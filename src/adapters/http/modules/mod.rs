//! HTTP adapter for the Module Registry.
//!
//! - `GET /api/modules` - Modules visible to the caller
//! - `GET /api/admin/modules` - Full registry (admin)
//! - `PUT /api/admin/modules/:id` - Save a module (admin)
//! - `GET /api/admin/assistants` - Assistant directory (admin)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{admin_routes, module_routes};
