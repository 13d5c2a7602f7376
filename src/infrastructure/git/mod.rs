//! Source-control adapters

pub mod cached;

pub use cached::*;
