//! Commit analysis domain
//!
//! Produces a classification for every commit the conventional parser could
//! not handle, walking a configurable fallback chain: subject heuristics,
//! AST diffing, then an AI provider, gated by a minimum confidence.

pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use errors::*;
pub use repository::*;
pub use services::*;
pub use value_objects::*;
