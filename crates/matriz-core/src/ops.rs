//! Operation traits that matrix backends implement

use crate::error::{MatError, Result};
use crate::shape::Shape;

/// The elementwise arithmetic contract of a dense matrix.
///
/// Exactly one production implementation exists (`matriz_cpu::Matrix`).
/// All binary operations mutate `self` in place and require matching
/// shapes; they must detect shape and liveness errors before touching the
/// destination buffer, so a failed call never partially mutates.
pub trait MatOps: Sized {
    /// Matrix dimensions.
    fn shape(&self) -> Shape;

    /// `self += other`, elementwise.
    fn add_assign_mat(&mut self, other: &Self) -> Result<()>;

    /// `self -= other`, elementwise.
    fn sub_assign_mat(&mut self, other: &Self) -> Result<()>;

    /// `self *= other`, elementwise (Hadamard product).
    ///
    /// This is not the linear-algebra matrix product; see
    /// [`MatOps::product`].
    fn mul_assign_mat(&mut self, other: &Self) -> Result<()>;

    /// `self *= scalar`, every element.
    fn scale(&mut self, scalar: f32) -> Result<()>;

    /// Overwrite `self`'s buffer with `source`'s values.
    fn copy_from(&mut self, source: &Self) -> Result<()>;

    /// Allocate an independent deep copy.
    fn duplicate(&self) -> Result<Self>;

    /// True row-by-column matrix product. Deliberately unsupported.
    fn product(&mut self, _other: &Self) -> Result<()> {
        Err(MatError::NotImplemented("matrix product"))
    }
}
