//! Application services

pub mod release_orchestrator;

pub use release_orchestrator::*;
