// Core release orchestration engine: domain model, use-cases, and adapters.
pub mod error;
pub mod observability;
pub mod redaction;
pub mod utils;

// Domain-Driven Design layers
pub mod domains;

pub mod application;

pub mod infrastructure;

// Re-export key types for downstream consumers
pub use error::{ErrorKind, ReleaseEngineError, Result};
