//! HTTP adapter for subscription endpoints.
//!
//! - `GET /api/subscription` - Current plan, credits and modules
//! - `POST /api/subscription` - Ensure the record exists
//! - `POST /api/subscription/interactions` - Authorize an AI interaction
//! - `POST /api/subscription/checkout` - Start checkout
//! - `POST /api/subscription/checkout/complete` - Reconcile on return
//! - `POST /api/webhooks/stripe` - Checkout webhook

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::{subscription_routes, webhook_routes};
