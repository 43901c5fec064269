//! Error types for matriz

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatError {
    #[error("invalid shape: {rows}x{cols} (both dimensions must be positive)")]
    InvalidShape { rows: usize, cols: usize },

    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("index out of bounds: ({row}, {col}) for shape {rows}x{cols}")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("matrix buffer has been released")]
    NullBuffer,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

pub type Result<T> = std::result::Result<T, MatError>;
