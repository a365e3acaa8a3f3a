//! Triangular substitution kernels shared by the LU and QR solvers.
//!
//! All kernels work on a multi-column right-hand side `B` in place, one row
//! at a time, which is the cache-friendly direction for row-major storage.

use crate::core::traits::Scalar;
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix};

/// Solve `L·X = B` for unit lower-triangular `L`, overwriting `B` with `X`.
///
/// Only the strict lower triangle of `l` is read; its diagonal is taken to be 1.
pub(crate) fn forward_substitute_unit_lower<T: Scalar>(l: &Matrix<T>, b: &mut Matrix<T>) {
    let n = l.rows();
    let k = b.cols();
    debug_assert!(b.rows() >= n);
    if k == 0 {
        return;
    }
    for r in 1..n {
        let (solved, rest) = b.as_mut_slice().split_at_mut(r * k);
        let x_r = &mut rest[..k];
        for (c, &l_rc) in l.row(r)[..r].iter().enumerate() {
            if l_rc == T::zero() {
                continue;
            }
            for (x, &y) in x_r.iter_mut().zip(&solved[c * k..(c + 1) * k]) {
                *x = *x - l_rc * y;
            }
        }
    }
}

/// Solve `U·X = B` for upper-triangular `U`, overwriting the leading
/// `U.cols()` rows of `B` with `X`.
///
/// `u` may be taller than wide (an upper-trapezoidal R); only its leading
/// square block is read. Rows of `B` past `U.cols()` are left untouched.
pub(crate) fn back_substitute_upper<T: Scalar>(u: &Matrix<T>, b: &mut Matrix<T>) {
    let n = u.cols();
    let k = b.cols();
    debug_assert!(b.rows() >= n);
    if k == 0 {
        return;
    }
    for r in (0..n).rev() {
        let (head, solved) = b.as_mut_slice().split_at_mut((r + 1) * k);
        let x_r = &mut head[r * k..];
        let u_row = u.row(r);
        for (offset, &u_rc) in u_row[r + 1..n].iter().enumerate() {
            if u_rc == T::zero() {
                continue;
            }
            for (x, &y) in x_r.iter_mut().zip(&solved[offset * k..(offset + 1) * k]) {
                *x = *x - u_rc * y;
            }
        }
        let diag = u_row[r];
        for x in x_r.iter_mut() {
            *x = *x / diag;
        }
    }
}

/// Reject a right-hand side whose row count differs from `expected`.
pub(crate) fn check_rhs<T>(expected: usize, b: &Matrix<T>) -> Result<(), LinalgError> {
    if b.rows() != expected {
        return Err(LinalgError::DimensionMismatch { expected, got: b.rows() });
    }
    Ok(())
}

/// Split a packed LU working buffer into `L` (fresh allocation, unit
/// diagonal) and `U` (reuses the buffer, strict lower part zeroed).
pub(crate) fn split_packed_lu<T: Scalar>(
    mut work: Matrix<T>,
) -> (SquareMatrix<T>, SquareMatrix<T>) {
    let n = work.rows();
    let mut l = Matrix::identity(n);
    for r in 1..n {
        for c in 0..r {
            l[(r, c)] = work[(r, c)];
            work[(r, c)] = T::zero();
        }
    }
    (SquareMatrix::new_unchecked(l), SquareMatrix::new_unchecked(work))
}

/// Inverse of `split_packed_lu`: strict lower part of `l` plus all of `u`.
pub(crate) fn pack_lu<T: Scalar>(l: &Matrix<T>, u: &Matrix<T>) -> SquareMatrix<T> {
    let n = u.rows();
    SquareMatrix::from_fn(n, |r, c| if c < r { l[(r, c)] } else { u[(r, c)] })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_substitution_with_implicit_unit_diagonal() {
        // diagonal entries are ignored
        let l = Matrix::from_rows(&[[9.0, 0.0, 0.0], [2.0, 9.0, 0.0], [1.0, 3.0, 9.0]]).unwrap();
        let mut b = Matrix::from_rows(&[[1.0, 2.0], [4.0, 5.0], [10.0, 11.0]]).unwrap();
        forward_substitute_unit_lower(&l, &mut b);
        // x0 = b0; x1 = b1 - 2 x0; x2 = b2 - x0 - 3 x1
        assert_eq!(b.row(0), &[1.0, 2.0]);
        assert_eq!(b.row(1), &[2.0, 1.0]);
        assert_eq!(b.row(2), &[3.0, 6.0]);
    }

    #[test]
    fn back_substitution_on_leading_block() {
        let u = Matrix::from_rows(&[[2.0, 1.0], [0.0, 4.0], [0.0, 0.0]]).unwrap();
        let mut b = Matrix::from_rows(&[[5.0], [8.0], [7.0]]).unwrap();
        back_substitute_upper(&u, &mut b);
        assert_abs_diff_eq!(b[(1, 0)], 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(b[(0, 0)], 1.5, epsilon = 1e-15);
        // rows past the square block are untouched
        assert_eq!(b[(2, 0)], 7.0);
    }

    #[test]
    fn split_and_pack_are_inverse() {
        let packed = Matrix::from_rows(&[[4.0, 3.0], [1.5, -1.5]]).unwrap();
        let (l, u) = split_packed_lu(packed.clone());
        assert_eq!(l.as_slice(), &[1.0, 0.0, 1.5, 1.0]);
        assert_eq!(u.as_slice(), &[4.0, 3.0, 0.0, -1.5]);
        assert_eq!(pack_lu(&l, &u).into_inner(), packed);
    }

    #[test]
    fn rhs_row_count_is_checked() {
        let b = Matrix::<f64>::zeros(3, 1);
        assert!(check_rhs(3, &b).is_ok());
        assert_eq!(check_rhs(2, &b), Err(LinalgError::DimensionMismatch { expected: 2, got: 3 }));
    }
}
