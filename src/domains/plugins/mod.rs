//! Plugin domain
//!
//! The hook contract an external plugin host implements. Only the contract
//! lives here; plugin discovery and registries are the host's concern.

pub mod errors;
pub mod repository;
pub mod value_objects;

pub use errors::*;
pub use repository::*;
pub use value_objects::*;
