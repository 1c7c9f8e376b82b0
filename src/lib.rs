//! Preskriptor - Subscription access and credit service
//!
//! Decides which assistant modules a prescriber may open, meters AI
//! interactions against their plan's credits, and reconciles hosted
//! checkout purchases into plan upgrades exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
