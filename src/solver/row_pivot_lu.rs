//! LU factorization with partial (row) pivoting.
//!
//! At step `k` the entry of largest magnitude on or below the diagonal of
//! column `k` is swapped onto the diagonal and used as the pivot. Whole rows
//! are swapped, including the multipliers already stored to the left of the
//! diagonal, so all row exchanges collapse into a single permutation:
//!
//! `P·A = L·U`
//!
//! A pivot below the tolerance does not abort the factorization. The first
//! such column is recorded, the state becomes [`State::Singular`] and solves
//! are refused, but the factors stay available for inspection.

use std::fmt;

use crate::config::FactorOptions;
use crate::core::traits::{Factorization, Factors, Scalar, Solve, State};
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix};
use crate::matrix::permutation::PermutationMatrix;
use crate::solver::no_pivot_lu::eliminate_below;
use crate::solver::triangular::{
    back_substitute_upper, check_rhs, forward_substitute_unit_lower, pack_lu, split_packed_lu,
};
use crate::solver::write_factor;

/// LU factorization `P·A = L·U` with row pivoting.
#[derive(Clone, Debug)]
pub struct RowPivotLu<T> {
    l: Option<SquareMatrix<T>>,
    u: Option<SquareMatrix<T>>,
    p: Option<PermutationMatrix>,
    singular_at: Option<usize>,
    state: State,
    options: FactorOptions<T>,
}

impl<T: Scalar> RowPivotLu<T> {
    /// Create an empty factorization (state `Unset`).
    pub fn new() -> Self {
        Self::with_options(FactorOptions::default())
    }

    pub fn with_options(options: FactorOptions<T>) -> Self {
        RowPivotLu { l: None, u: None, p: None, singular_at: None, state: State::Unset, options }
    }

    /// Factorize a copy of `a`.
    pub fn from_matrix(a: &SquareMatrix<T>) -> Result<Self, LinalgError> {
        let mut lu = Self::new();
        lu.compute(a)?;
        Ok(lu)
    }

    /// Factorize `a`, reusing its storage for `U`.
    pub fn from_owned(a: SquareMatrix<T>) -> Result<Self, LinalgError> {
        let mut lu = Self::new();
        lu.compute_owned(a)?;
        Ok(lu)
    }

    pub fn options(&self) -> &FactorOptions<T> {
        &self.options
    }

    pub fn l(&self) -> Option<&SquareMatrix<T>> {
        self.l.as_ref()
    }

    pub fn u(&self) -> Option<&SquareMatrix<T>> {
        self.u.as_ref()
    }

    pub fn p(&self) -> Option<&PermutationMatrix> {
        self.p.as_ref()
    }

    /// First column whose pivot fell below the tolerance.
    pub fn singular_column(&self) -> Option<usize> {
        self.singular_at
    }

    /// Packed storage: strict lower part of `L` and all of `U` in one matrix.
    pub fn packed_lu(&self) -> Result<SquareMatrix<T>, LinalgError> {
        self.ensure_factored()?;
        let l = self.l.as_ref().ok_or(LinalgError::FactorUnavailable("L"))?;
        let u = self.u.as_ref().ok_or(LinalgError::FactorUnavailable("U"))?;
        Ok(pack_lu(l, u))
    }

    pub fn steal_l(&mut self) -> Result<SquareMatrix<T>, LinalgError> {
        self.ensure_factored()?;
        log::trace!("RowPivotLu: stealing L");
        self.l.take().ok_or(LinalgError::FactorUnavailable("L"))
    }

    pub fn steal_u(&mut self) -> Result<SquareMatrix<T>, LinalgError> {
        self.ensure_factored()?;
        log::trace!("RowPivotLu: stealing U");
        self.u.take().ok_or(LinalgError::FactorUnavailable("U"))
    }

    pub fn steal_p(&mut self) -> Result<PermutationMatrix, LinalgError> {
        self.ensure_factored()?;
        log::trace!("RowPivotLu: stealing P");
        self.p.take().ok_or(LinalgError::FactorUnavailable("P"))
    }

    /// Take both triangular factors at once; nothing is taken unless both
    /// are present.
    pub fn steal_lu(&mut self) -> Result<(SquareMatrix<T>, SquareMatrix<T>), LinalgError> {
        self.ensure_factored()?;
        if self.l.is_none() {
            return Err(LinalgError::FactorUnavailable("L"));
        }
        if self.u.is_none() {
            return Err(LinalgError::FactorUnavailable("U"));
        }
        Ok((self.steal_l()?, self.steal_u()?))
    }

    /// `det(A) = sign(P) · Πᵢ uᵢᵢ`.
    pub fn determinant(&self) -> Result<T, LinalgError> {
        self.ensure_factored()?;
        let u = self.u.as_ref().ok_or(LinalgError::FactorUnavailable("U"))?;
        let p = self.p.as_ref().ok_or(LinalgError::FactorUnavailable("P"))?;
        let det = (0..u.size()).fold(T::one(), |acc, i| acc * u[(i, i)]);
        Ok(if p.sign() < 0 { -det } else { det })
    }

    fn ensure_factored(&self) -> Result<(), LinalgError> {
        if self.state.is_factored() {
            Ok(())
        } else {
            Err(LinalgError::NotComputed)
        }
    }

    fn reset(&mut self) {
        self.l = None;
        self.u = None;
        self.p = None;
        self.singular_at = None;
        self.state = State::Unset;
    }
}

impl<T: Scalar> Default for RowPivotLu<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar> Factorization for RowPivotLu<T> {
    type Input = SquareMatrix<T>;

    fn compute_owned(&mut self, a: SquareMatrix<T>) -> Result<State, LinalgError> {
        self.reset();
        let mut work = a.into_inner();
        let n = work.rows();
        let tol = self.options.threshold(work.max_abs(), n);
        let mut p = PermutationMatrix::identity(n);
        let mut singular_at = None;

        for k in 0..n {
            let mut max_elem = work[(k, k)].abs();
            let mut max_index = k;
            for i in k + 1..n {
                let abs_elem = work[(i, k)].abs();
                if abs_elem > max_elem {
                    max_elem = abs_elem;
                    max_index = i;
                }
            }

            if max_index != k {
                p.set_swap(k, max_index);
                work.swap_rows(k, max_index);
            }

            if max_elem <= tol && singular_at.is_none() {
                log::warn!("RowPivotLu: pivot {max_elem} in column {k} below tolerance {tol}");
                singular_at = Some(k);
            }
            // column already eliminated
            if max_elem == T::zero() {
                continue;
            }
            eliminate_below(&mut work, k);
        }

        let (l, u) = split_packed_lu(work);
        self.l = Some(l);
        self.u = Some(u);
        self.p = Some(p);
        self.singular_at = singular_at;
        self.state = if singular_at.is_some() { State::Singular } else { State::Computed };
        log::debug!("RowPivotLu: factorized {n}x{n} matrix, state {}", self.state);
        Ok(self.state)
    }

    fn state(&self) -> State {
        self.state
    }

    fn available(&self) -> Factors {
        let mut f = Factors::empty();
        f.set(Factors::L, self.l.is_some());
        f.set(Factors::U, self.u.is_some());
        f.set(Factors::P, self.p.is_some());
        f
    }
}

impl<T: Scalar> Solve<T> for RowPivotLu<T> {
    fn solve_matrix_inplace(&self, b: &mut Matrix<T>) -> Result<(), LinalgError> {
        self.ensure_factored()?;
        let l = self.l.as_ref().ok_or(LinalgError::FactorUnavailable("L"))?;
        let u = self.u.as_ref().ok_or(LinalgError::FactorUnavailable("U"))?;
        let p = self.p.as_ref().ok_or(LinalgError::FactorUnavailable("P"))?;
        if let Some(k) = self.singular_at {
            return Err(LinalgError::SingularMatrix(k));
        }
        check_rhs(u.size(), b)?;
        p.permute_rows(b)?;
        forward_substitute_unit_lower(l, b);
        back_substitute_upper(u, b);
        Ok(())
    }
}

impl<T: Scalar> fmt::Display for RowPivotLu<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RowPivotLu ({})", self.state)?;
        if !self.state.is_factored() {
            return Ok(());
        }
        write_factor(f, "P", self.p.as_ref())?;
        write_factor(f, "L", self.l.as_ref())?;
        write_factor(f, "U", self.u.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::dense::Vector;
    use approx::assert_abs_diff_eq;

    fn a_734() -> SquareMatrix<f64> {
        SquareMatrix::from_rows(&[[7.0, 3.0, 4.0], [1.0, 2.0, 3.0], [6.0, 5.0, 4.0]]).unwrap()
    }

    fn assert_close(a: &Matrix<f64>, b: &Matrix<f64>, tol: f64) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_abs_diff_eq!(*x, *y, epsilon = tol);
        }
    }

    #[test]
    fn pa_equals_lu() {
        let a = a_734();
        let lu = RowPivotLu::from_matrix(&a).unwrap();
        assert_eq!(lu.state(), State::Computed);
        let mut pa = a.clone().into_inner();
        lu.p().unwrap().permute_rows(&mut pa).unwrap();
        let prod = &**lu.l().unwrap() * &**lu.u().unwrap();
        assert_close(&pa, &prod, 1e-13);
    }

    #[test]
    fn swapped_identity_succeeds_where_no_pivot_fails() {
        let a = SquareMatrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let lu = RowPivotLu::from_matrix(&a).unwrap();
        assert_eq!(lu.p().unwrap().to_permutation(), vec![1, 0]);
        let x = lu.solve(&Vector::from(vec![1.0, 2.0])).unwrap();
        assert_eq!(x.as_slice(), &[2.0, 1.0]);
        assert_eq!(lu.determinant().unwrap(), -1.0);
    }

    #[test]
    fn singular_matrix_is_reported_through_state() {
        let a = SquareMatrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
        let mut lu = RowPivotLu::new();
        assert_eq!(lu.compute(&a), Ok(State::Singular));
        assert_eq!(lu.singular_column(), Some(1));
        assert_eq!(lu.determinant().unwrap(), 0.0);
        let b = Vector::from(vec![1.0, 1.0]);
        assert_eq!(lu.solve(&b), Err(LinalgError::SingularMatrix(1)));
        // factors remain inspectable
        assert_eq!(lu.available(), Factors::L | Factors::U | Factors::P);
    }

    #[test]
    fn recompute_replaces_singular_state() {
        let mut lu = RowPivotLu::new();
        let singular = SquareMatrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
        lu.compute(&singular).unwrap();
        assert_eq!(lu.compute(&a_734()), Ok(State::Computed));
        assert_eq!(lu.singular_column(), None);
    }

    #[test]
    fn determinant_matches_cofactor_expansion() {
        // 7(8-15) - 3(4-18) + 4(5-12)
        let lu = RowPivotLu::from_matrix(&a_734()).unwrap();
        assert_abs_diff_eq!(lu.determinant().unwrap(), -35.0, epsilon = 1e-12);
    }

    #[test]
    fn stealing_p_blocks_solves_but_keeps_lu() {
        let mut lu = RowPivotLu::from_matrix(&a_734()).unwrap();
        let p = lu.steal_p().unwrap();
        assert_eq!(p.size(), 3);
        assert_eq!(lu.steal_p(), Err(LinalgError::FactorUnavailable("P")));
        let b = Vector::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(lu.solve(&b), Err(LinalgError::FactorUnavailable("P")));
        let (l, u) = lu.steal_lu().unwrap();
        assert!(l.is_lower_triangular(0.0));
        assert!(u.is_upper_triangular(0.0));
        assert!(lu.available().is_empty());
    }

    #[test]
    fn steal_before_compute_is_rejected() {
        let mut lu = RowPivotLu::<f64>::new();
        assert_eq!(lu.steal_l(), Err(LinalgError::NotComputed));
        assert_eq!(lu.steal_p(), Err(LinalgError::NotComputed));
    }

    #[test]
    fn wrong_rhs_size_leaves_rhs_untouched() {
        let lu = RowPivotLu::from_matrix(&a_734()).unwrap();
        let mut b = Matrix::from_rows(&[[1.0], [2.0]]).unwrap();
        assert_eq!(
            lu.solve_inplace(&mut b),
            Err(LinalgError::DimensionMismatch { expected: 3, got: 2 })
        );
        assert_eq!(b.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn display_lists_all_factors() {
        let lu = RowPivotLu::from_matrix(&a_734()).unwrap();
        let text = format!("{lu:.3}");
        assert!(text.starts_with("RowPivotLu (computed)"));
        assert!(text.contains("P ="));
        assert!(text.contains("L ="));
        assert!(text.contains("U ="));
    }
}
