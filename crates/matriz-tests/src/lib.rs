//! Shared test suite for matriz backends
//!
//! Scenario-level tests that exercise the public `Matrix` API end to end:
//! construction, arithmetic through both execution paths, and the disposal
//! lifecycle.

pub mod arith;
pub mod creation;
pub mod lifecycle;
pub mod parallel;

/// Test utilities
pub mod utils {
    use matriz_core::MatOps;
    use matriz_cpu::Matrix;

    /// Check if two f32 values are approximately equal
    pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
        if a.is_nan() && b.is_nan() {
            return true;
        }
        if a.is_infinite() && b.is_infinite() {
            return a.signum() == b.signum();
        }
        (a - b).abs() < tol
    }

    /// Check if two live matrices hold exactly the same values
    pub fn mats_eq(a: &Matrix, b: &Matrix) -> bool {
        a.shape() == b.shape() && a.as_slice().unwrap() == b.as_slice().unwrap()
    }

    /// Matrix whose element at `(r, c)` is a deterministic non-trivial value
    pub fn patterned(rows: usize, cols: usize) -> Matrix {
        let values: Vec<f32> = (0..rows * cols)
            .map(|i| ((i * 31 + 7) % 113) as f32 - 56.0)
            .collect();
        Matrix::from_values(rows, cols, &values).unwrap()
    }

    /// The two 5x5 operands used across the arithmetic scenarios: every row
    /// of the first is `[1, 2, 3, 4, 5]`, every row of the second is
    /// `[5, 4, 3, 2, 1]`.
    pub fn ramp_pair() -> (Matrix, Matrix) {
        let a: Vec<f32> = (0..25).map(|i| (i % 5 + 1) as f32).collect();
        let b: Vec<f32> = (0..25).map(|i| (5 - i % 5) as f32).collect();
        (
            Matrix::from_values(5, 5, &a).unwrap(),
            Matrix::from_values(5, 5, &b).unwrap(),
        )
    }

    /// Default tolerance for floating point comparisons
    pub const DEFAULT_TOL: f32 = 1e-6;
}
