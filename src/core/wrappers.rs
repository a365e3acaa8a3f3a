//! Interop with `faer` dense matrices and `Vec<T>` vectors.
//!
//! `Matrix` converts to and from `faer::Mat` element by element (the two use
//! different storage orders), which lets callers hand systems to faer's own
//! solvers or take faer-built matrices into the factorizations here. `Matrix`
//! also implements `MatVec` on plain vectors for residual checks.

use faer::Mat;

use crate::core::traits::{MatVec, Scalar};
use crate::matrix::dense::Matrix;

/// Copy a `faer::Mat` into row-major storage.
impl<T: Scalar> From<&Mat<T>> for Matrix<T> {
    fn from(m: &Mat<T>) -> Self {
        Matrix::from_fn(m.nrows(), m.ncols(), |i, j| m[(i, j)])
    }
}

impl<T: Scalar> Matrix<T> {
    /// Copy into a column-major `faer::Mat`.
    pub fn to_faer(&self) -> Mat<T> {
        Mat::from_fn(self.rows(), self.cols(), |i, j| self[(i, j)])
    }
}

/// `y = A * x`, one output row per task when `rayon` is enabled.
impl<T: Scalar> MatVec<Vec<T>> for Matrix<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.rows(), y.len(), "Output vector y has incorrect length");
        assert_eq!(self.cols(), x.len(), "Input vector x has incorrect length");
        let row_dot = |i: usize| {
            self.row(i).iter().zip(x.iter()).fold(T::zero(), |acc, (&a, &b)| acc + a * b)
        };
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = row_dot(i));
        }
        #[cfg(not(feature = "rayon"))]
        {
            y.iter_mut().enumerate().for_each(|(i, yi)| *yi = row_dot(i));
        }
    }
}
