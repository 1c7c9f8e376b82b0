//! HTTP adapters - REST API implementations.
//!
//! Each area has its own sub-router; `api_router` mounts them under `/api`
//! and `server` wraps the result in the tower-http layers.

mod app_state;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod prescription;
pub mod server;
pub mod subscription;

use axum::Router;

pub use app_state::AppState;
pub use error::{ApiError, ErrorResponse};

/// All API routes, nested under `/api`, with state applied.
///
/// ```text
/// /api/subscription/...   caller's plan, credits, checkout
/// /api/webhooks/stripe    billing provider callbacks
/// /api/modules            caller's module list
/// /api/admin/...          registry editor
/// /api/prescriptions      prescription widget
/// ```
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/subscription", subscription::subscription_routes())
        .nest("/webhooks", subscription::webhook_routes())
        .nest("/modules", modules::module_routes())
        .nest("/admin", modules::admin_routes())
        .nest("/prescriptions", prescription::prescription_routes());

    Router::new().nest("/api", api).with_state(state)
}
