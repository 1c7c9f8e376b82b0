//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Write paths (credit consumption, reconciliation) always go to the store;
//! read paths go through [`fallback`] so they answer even when it is down.

pub mod fallback;
pub mod handlers;

pub use fallback::{fetch_with_fallback, FallbackReason, Fetched, SubscriptionStateCache};
