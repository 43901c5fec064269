//! matriz core - shape metadata, error types and operation traits
//!
//! This crate defines the contract that a matrix backend implements.
//! The dense CPU backend lives in `matriz-cpu`.

pub mod error;
pub mod ops;
pub mod shape;

pub use error::{MatError, Result};
pub use ops::MatOps;
pub use shape::Shape;
