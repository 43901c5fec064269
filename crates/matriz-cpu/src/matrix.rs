//! The dense matrix entity.

use std::ops::{Add, Mul, Sub};

use matriz_core::{MatError, MatOps, Result, Shape};

use crate::kernels;

/// Dense row-major `f32` matrix with an explicit disposal lifecycle.
///
/// The buffer is owned for the life of the value and can be released early
/// with [`Matrix::dispose`]; every operation on a disposed matrix fails with
/// [`MatError::NullBuffer`]. Operations validate liveness and shape before
/// touching the destination, so a failed call never partially mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    shape: Shape,
    buf: Option<Vec<f32>>,
}

impl Matrix {
    /// Zero-filled matrix of the given dimensions.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        let shape = Shape::new(rows, cols)?;
        Ok(Matrix {
            shape,
            buf: Some(vec![0.0; shape.len()]),
        })
    }

    /// Matrix filled row-major from `values`.
    ///
    /// Excess values are ignored; missing trailing values stay zero.
    pub fn from_values(rows: usize, cols: usize, values: &[f32]) -> Result<Self> {
        let mut m = Matrix::zeros(rows, cols)?;
        let buf = m.buf.as_mut().unwrap();
        let n = values.len().min(buf.len());
        buf[..n].copy_from_slice(&values[..n]);
        Ok(m)
    }

    /// Read the element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32> {
        let buf = self.live()?;
        Ok(buf[self.shape.checked_index(row, col)?])
    }

    /// Write the element at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Result<()> {
        let idx = self.shape.checked_index(row, col)?;
        self.live_mut()?[idx] = value;
        Ok(())
    }

    /// The backing buffer in row-major order.
    pub fn as_slice(&self) -> Result<&[f32]> {
        self.live()
    }

    /// Release the backing buffer. Idempotent; the shape remains readable.
    pub fn dispose(&mut self) {
        self.buf = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.buf.is_none()
    }

    fn live(&self) -> Result<&[f32]> {
        self.buf.as_deref().ok_or(MatError::NullBuffer)
    }

    fn live_mut(&mut self) -> Result<&mut [f32]> {
        self.buf.as_deref_mut().ok_or(MatError::NullBuffer)
    }

    fn check_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.shape != other.shape {
            return Err(MatError::ShapeMismatch {
                expected: self.shape.as_tuple(),
                got: other.shape.as_tuple(),
            });
        }
        Ok(())
    }

    /// Validate both operands, then hand their buffers to `run`.
    fn binary(
        &mut self,
        other: &Matrix,
        run: fn(&mut [f32], &[f32], Shape),
    ) -> Result<()> {
        self.check_same_shape(other)?;
        let src = other.live()?;
        let shape = self.shape;
        let dst = self.live_mut()?;
        run(dst, src, shape);
        Ok(())
    }
}

impl MatOps for Matrix {
    fn shape(&self) -> Shape {
        self.shape
    }

    fn add_assign_mat(&mut self, other: &Self) -> Result<()> {
        self.binary(other, kernels::add_region)
    }

    fn sub_assign_mat(&mut self, other: &Self) -> Result<()> {
        self.binary(other, kernels::sub_region)
    }

    fn mul_assign_mat(&mut self, other: &Self) -> Result<()> {
        self.binary(other, kernels::hadamard_region)
    }

    fn scale(&mut self, scalar: f32) -> Result<()> {
        let shape = self.shape;
        let dst = self.live_mut()?;
        kernels::scale_region(dst, scalar, shape);
        Ok(())
    }

    fn copy_from(&mut self, source: &Self) -> Result<()> {
        self.binary(source, kernels::copy_region)
    }

    fn duplicate(&self) -> Result<Self> {
        let buf = self.live()?.to_vec();
        Ok(Matrix {
            shape: self.shape,
            buf: Some(buf),
        })
    }
}

// Operator sugar over the in-place trait methods. Operators take references
// and allocate a fresh result.
//
// # Panics
//
// All operators panic on shape mismatch or a disposed operand; use the
// `MatOps` methods directly for fallible handling.

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        let mut out = self.duplicate().unwrap_or_else(|e| panic!("{e}"));
        out.add_assign_mat(rhs).unwrap_or_else(|e| panic!("{e}"));
        out
    }
}

impl Sub<&Matrix> for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        let mut out = self.duplicate().unwrap_or_else(|e| panic!("{e}"));
        out.sub_assign_mat(rhs).unwrap_or_else(|e| panic!("{e}"));
        out
    }
}

/// Elementwise (Hadamard) product, not the matrix product.
impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        let mut out = self.duplicate().unwrap_or_else(|e| panic!("{e}"));
        out.mul_assign_mat(rhs).unwrap_or_else(|e| panic!("{e}"));
        out
    }
}

impl Mul<f32> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f32) -> Matrix {
        let mut out = self.duplicate().unwrap_or_else(|e| panic!("{e}"));
        out.scale(rhs).unwrap_or_else(|e| panic!("{e}"));
        out
    }
}

impl Mul<&Matrix> for f32 {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        rhs * self
    }
}
