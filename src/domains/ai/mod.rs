//! AI generation domain
//!
//! Provider-agnostic text generation for changelogs, release notes, and
//! commit classification. The resilient service layers a token-bucket rate
//! limiter, retries with exponential backoff, per-attempt timeouts, and
//! secret redaction over any provider implementation.

pub mod errors;
pub mod rate_limiter;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use errors::*;
pub use rate_limiter::*;
pub use repository::*;
pub use services::*;
pub use value_objects::*;
