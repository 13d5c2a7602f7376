//! Application layer
//!
//! Use-case command handlers orchestrating the domain model over the ports,
//! plus the input validators every handler runs first.

pub mod commands;
pub mod services;
pub mod validation;

pub use services::ReleaseOrchestrator;
