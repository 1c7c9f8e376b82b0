//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use crate::adapters::http::AppState;

use super::handlers::{
    authorize_interaction, complete_checkout, ensure_subscription, get_subscription_status,
    handle_stripe_webhook, start_checkout,
};

/// Routes mounted at `/subscription`.
///
/// - `GET /` - status with module visibility
/// - `POST /` - create the Freemium record if missing
/// - `POST /interactions` - spend one credit on a module
/// - `POST /checkout` - open a hosted checkout
/// - `POST /checkout/complete` - reconcile after the redirect
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_subscription_status).post(ensure_subscription))
        .route("/interactions", post(authorize_interaction))
        .route("/checkout", post(start_checkout))
        .route("/checkout/complete", post(complete_checkout))
}

/// Routes mounted at `/webhooks`. No caller identity; the payload signature
/// is the only authentication.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}
