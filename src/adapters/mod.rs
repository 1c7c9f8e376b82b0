//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - OpenAI assistant directory
//! - `http` - axum REST API
//! - `memory` - In-memory stores and widget for development and tests
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe Checkout provider and its mock

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
