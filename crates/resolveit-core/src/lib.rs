//! Shared plumbing for ResolveIt services: tracing setup, health handlers,
//! request ids, environment config helpers and serde helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
