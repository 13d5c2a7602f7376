//! Git domain
//!
//! The abstract source-control port and the validated value objects that
//! cross it. No concrete git driver lives in this crate; adapters implement
//! [`repository::SourceControlPort`].

pub mod entities;
pub mod errors;
pub mod repository;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use repository::*;
pub use value_objects::*;
