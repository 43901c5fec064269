//! Dense CPU matrix backend for matriz.
//!
//! A [`Matrix`] owns a flat row-major `f32` buffer. Its elementwise
//! operations run through unrolled kernels picked once per process from the
//! CPU's vector capabilities, and switch to a fork-join tiled path when the
//! element count crosses a per-operation threshold. Sequential and tiled
//! paths produce bit-identical results.

pub mod capability;
pub mod kernels;
mod matrix;
pub mod strategy;
pub mod tile;

pub use capability::KernelVariant;
pub use matrix::Matrix;
pub use strategy::{execution_mode, ExecMode, OpFamily};

pub use matriz_core::{MatError, MatOps, Result, Shape};
