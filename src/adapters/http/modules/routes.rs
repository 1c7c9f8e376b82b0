//! Axum router configuration for Module Registry endpoints.

use axum::{
    routing::{get, put},
    Router,
};

use crate::adapters::http::AppState;

use super::handlers::{list_assistants, list_modules, list_registry, save_module};

/// Routes mounted at `/modules`.
pub fn module_routes() -> Router<AppState> {
    Router::new().route("/", get(list_modules))
}

/// Routes mounted at `/admin`. Every handler requires `AdminUser`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/modules", get(list_registry))
        .route("/modules/:id", put(save_module))
        .route("/assistants", get(list_assistants))
}
