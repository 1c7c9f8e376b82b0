//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `subscription` - Plans, credits and the access resolver
//! - `module` - Module Registry entity

pub mod foundation;
pub mod module;
pub mod subscription;
