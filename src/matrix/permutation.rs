//! Row/column permutations stored as a sequence of swaps.
//!
//! Entry `k` of the swap sequence names the row (or column) that is exchanged
//! with row `k` at step `k`. Applying the permutation replays the swaps in
//! ascending order; a reversed permutation replays them in descending order,
//! which is exactly its inverse. This is the form row pivoting produces
//! naturally, so the LU factorization records its pivots here directly.

use std::fmt;

use crate::core::traits::Scalar;
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix};

/// Permutation matrix of size `n`, O(n) storage.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PermutationMatrix {
    swaps: Vec<usize>,
    reversed: bool,
}

impl PermutationMatrix {
    /// The identity permutation.
    pub fn identity(n: usize) -> Self {
        PermutationMatrix { swaps: (0..n).collect(), reversed: false }
    }

    /// Build from one-line form `p`, where row `i` of `P·A` is row `p[i]` of `A`.
    ///
    /// Fails with `InvalidPermutation` unless `p` is a bijection on `0..p.len()`.
    pub fn from_permutation(p: Vec<usize>) -> Result<Self, LinalgError> {
        let n = p.len();
        let mut seen = vec![false; n];
        for &v in &p {
            if v >= n {
                return Err(LinalgError::InvalidPermutation(format!(
                    "index {v} out of range 0..{n}"
                )));
            }
            if seen[v] {
                return Err(LinalgError::InvalidPermutation(format!("index {v} appears twice")));
            }
            seen[v] = true;
        }

        // Sort `p` from the right, recording the swap that places each value.
        let mut p = p;
        let mut pos = vec![0; n];
        for (i, &v) in p.iter().enumerate() {
            pos[v] = i;
        }
        let mut swaps = vec![0; n];
        for i in (0..n).rev() {
            let j = pos[i];
            p.swap(i, j);
            pos[p[j]] = j;
            pos[i] = i;
            swaps[i] = j;
        }
        Ok(PermutationMatrix { swaps, reversed: false })
    }

    /// One-line form of the permutation (see `from_permutation`).
    pub fn to_permutation(&self) -> Vec<usize> {
        let mut p: Vec<usize> = (0..self.size()).collect();
        self.for_each_swap(|i, j| p.swap(i, j));
        p
    }

    pub fn size(&self) -> usize {
        self.swaps.len()
    }

    /// Raw swap sequence.
    pub fn swaps(&self) -> &[usize] {
        &self.swaps
    }

    pub(crate) fn set_swap(&mut self, k: usize, with: usize) {
        self.swaps[k] = with;
    }

    /// Invert in place. O(1).
    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Inverse (= transpose) of this permutation.
    pub fn reversed(&self) -> Self {
        let mut inv = self.clone();
        inv.reverse();
        inv
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Determinant of the permutation matrix: `+1` or `-1`.
    pub fn sign(&self) -> i32 {
        let transpositions = self.swaps.iter().enumerate().filter(|&(i, &s)| i != s).count();
        if transpositions % 2 == 0 { 1 } else { -1 }
    }

    /// Overwrite `a` with `P·a`.
    pub fn permute_rows<T>(&self, a: &mut Matrix<T>) -> Result<(), LinalgError> {
        if a.rows() != self.size() {
            return Err(LinalgError::DimensionMismatch { expected: self.size(), got: a.rows() });
        }
        self.for_each_swap(|i, j| a.swap_rows(i, j));
        Ok(())
    }

    /// Overwrite `a` with `a·Pᵀ`, permuting columns the way `permute_rows`
    /// permutes rows.
    pub fn permute_columns<T>(&self, a: &mut Matrix<T>) -> Result<(), LinalgError> {
        if a.cols() != self.size() {
            return Err(LinalgError::DimensionMismatch { expected: self.size(), got: a.cols() });
        }
        self.for_each_swap(|i, j| a.swap_columns(i, j));
        Ok(())
    }

    /// The product `self · other`, i.e. apply `other` first, then `self`.
    pub fn compose(&self, other: &PermutationMatrix) -> Result<PermutationMatrix, LinalgError> {
        if self.size() != other.size() {
            return Err(LinalgError::DimensionMismatch { expected: self.size(), got: other.size() });
        }
        let p = self.to_permutation();
        let q = other.to_permutation();
        PermutationMatrix::from_permutation(p.iter().map(|&i| q[i]).collect())
    }

    /// Dense `n × n` row-permutation matrix.
    pub fn to_matrix<T: Scalar>(&self) -> SquareMatrix<T> {
        let mut m = Matrix::identity(self.size());
        self.for_each_swap(|i, j| m.swap_rows(i, j));
        SquareMatrix::new_unchecked(m)
    }

    fn for_each_swap(&self, mut f: impl FnMut(usize, usize)) {
        let mut step = |i: usize| {
            let j = self.swaps[i];
            if i != j {
                f(i, j);
            }
        };
        if self.reversed {
            (0..self.size()).rev().for_each(&mut step);
        } else {
            (0..self.size()).for_each(&mut step);
        }
    }
}

impl fmt::Display for PermutationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(6);
        for i in self.to_permutation() {
            write!(f, "{i:>width$}")?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_one_line_form() {
        let p = vec![1, 2, 0, 4, 3];
        let pm = PermutationMatrix::from_permutation(p.clone()).unwrap();
        assert_eq!(pm.to_permutation(), p);
    }

    #[test]
    fn rejects_non_bijections() {
        assert!(matches!(
            PermutationMatrix::from_permutation(vec![0, 0, 1]),
            Err(LinalgError::InvalidPermutation(_))
        ));
        assert!(PermutationMatrix::from_permutation(vec![0, 3, 1]).is_err());
    }

    #[test]
    fn permute_rows_follows_one_line_form() {
        let pm = PermutationMatrix::from_permutation(vec![2, 0, 1]).unwrap();
        let mut a = Matrix::from_rows(&[[0.0], [1.0], [2.0]]).unwrap();
        pm.permute_rows(&mut a).unwrap();
        assert_eq!(a.as_slice(), &[2.0, 0.0, 1.0]);
    }

    #[test]
    fn reverse_is_the_inverse() {
        let pm = PermutationMatrix::from_permutation(vec![3, 0, 2, 1]).unwrap();
        let mut a = Matrix::from_fn(4, 2, |i, j| (10 * i + j) as f64);
        let orig = a.clone();
        pm.permute_rows(&mut a).unwrap();
        pm.reversed().permute_rows(&mut a).unwrap();
        assert_eq!(a, orig);
        assert_eq!(pm.compose(&pm.reversed()).unwrap().to_permutation(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn compose_matches_sequential_application() {
        let p = PermutationMatrix::from_permutation(vec![1, 2, 0]).unwrap();
        let q = PermutationMatrix::from_permutation(vec![0, 2, 1]).unwrap();
        let pq = p.compose(&q).unwrap();

        let mut seq = Matrix::from_fn(3, 1, |i, _| i as f64);
        q.permute_rows(&mut seq).unwrap();
        p.permute_rows(&mut seq).unwrap();

        let mut once = Matrix::from_fn(3, 1, |i, _| i as f64);
        pq.permute_rows(&mut once).unwrap();
        assert_eq!(seq, once);
    }

    #[test]
    fn sign_counts_transpositions() {
        assert_eq!(PermutationMatrix::identity(3).sign(), 1);
        assert_eq!(PermutationMatrix::from_permutation(vec![1, 0, 2]).unwrap().sign(), -1);
        assert_eq!(PermutationMatrix::from_permutation(vec![1, 2, 0]).unwrap().sign(), 1);
    }

    #[test]
    fn to_matrix_permutes_identity_rows() {
        let pm = PermutationMatrix::from_permutation(vec![1, 0]).unwrap();
        let m: SquareMatrix<f64> = pm.to_matrix();
        assert_eq!(m.as_slice(), &[0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn size_mismatch_is_reported() {
        let pm = PermutationMatrix::identity(3);
        let mut a = Matrix::<f64>::zeros(2, 2);
        assert_eq!(
            pm.permute_rows(&mut a),
            Err(LinalgError::DimensionMismatch { expected: 3, got: 2 })
        );
    }
}
