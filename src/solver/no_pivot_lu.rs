//! LU factorization without pivoting.
//!
//! Gaussian elimination on the diagonal pivots only: `A = L·U` with `L` unit
//! lower-triangular and `U` upper-triangular. The multipliers are written
//! into the sub-diagonal of the working buffer, which is afterwards split
//! into the two factors.
//!
//! This variant is not numerically stable and fails outright on a zero
//! pivot, even for nonsingular matrices such as `[[0, 1], [1, 0]]`. Prefer
//! [`RowPivotLu`](crate::solver::RowPivotLu) or
//! [`HouseholderQr`](crate::solver::HouseholderQr) unless the matrix is known
//! to be diagonally dominant.

use std::fmt;

use crate::config::FactorOptions;
use crate::core::traits::{Factorization, Factors, Scalar, Solve, State};
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix};
use crate::solver::triangular::{
    back_substitute_upper, check_rhs, forward_substitute_unit_lower, pack_lu, split_packed_lu,
};
use crate::solver::write_factor;

/// LU factorization `A = L·U` without row exchanges.
#[derive(Clone, Debug)]
pub struct NoPivotLu<T> {
    l: Option<SquareMatrix<T>>,
    u: Option<SquareMatrix<T>>,
    state: State,
    options: FactorOptions<T>,
}

impl<T: Scalar> NoPivotLu<T> {
    /// Create an empty factorization (state `Unset`).
    pub fn new() -> Self {
        Self::with_options(FactorOptions::default())
    }

    pub fn with_options(options: FactorOptions<T>) -> Self {
        NoPivotLu { l: None, u: None, state: State::Unset, options }
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

    /// The unit lower-triangular factor, if computed and not stolen.
    pub fn l(&self) -> Option<&SquareMatrix<T>> {
        self.l.as_ref()
    }

    /// The upper-triangular factor, if computed and not stolen.
    pub fn u(&self) -> Option<&SquareMatrix<T>> {
        self.u.as_ref()
    }

    /// Packed storage: strict lower part of `L` and all of `U` in one matrix.
    pub fn packed_lu(&self) -> Result<SquareMatrix<T>, LinalgError> {
        let (l, u) = self.factors()?;
        Ok(pack_lu(l, u))
    }

    /// Take ownership of `L`. Later solves fail with `FactorUnavailable`.
    pub fn steal_l(&mut self) -> Result<SquareMatrix<T>, LinalgError> {
        self.ensure_factored()?;
        log::trace!("NoPivotLu: stealing L");
        self.l.take().ok_or(LinalgError::FactorUnavailable("L"))
    }

    /// Take ownership of `U`. Later solves fail with `FactorUnavailable`.
    pub fn steal_u(&mut self) -> Result<SquareMatrix<T>, LinalgError> {
        self.ensure_factored()?;
        log::trace!("NoPivotLu: stealing U");
        self.u.take().ok_or(LinalgError::FactorUnavailable("U"))
    }

    /// Take ownership of both `(L, U)`; nothing is taken unless both are present.
    pub fn steal_lu(&mut self) -> Result<(SquareMatrix<T>, SquareMatrix<T>), LinalgError> {
        self.factors()?;
        let l = self.steal_l()?;
        let u = self.steal_u()?;
        Ok((l, u))
    }

    /// Product of the diagonal of `U`.
    pub fn determinant(&self) -> Result<T, LinalgError> {
        self.ensure_factored()?;
        let u = self.u.as_ref().ok_or(LinalgError::FactorUnavailable("U"))?;
        Ok((0..u.size()).fold(T::one(), |acc, i| acc * u[(i, i)]))
    }

    fn ensure_factored(&self) -> Result<(), LinalgError> {
        if self.state.is_factored() {
            Ok(())
        } else {
            Err(LinalgError::NotComputed)
        }
    }

    fn factors(&self) -> Result<(&SquareMatrix<T>, &SquareMatrix<T>), LinalgError> {
        self.ensure_factored()?;
        let l = self.l.as_ref().ok_or(LinalgError::FactorUnavailable("L"))?;
        let u = self.u.as_ref().ok_or(LinalgError::FactorUnavailable("U"))?;
        Ok((l, u))
    }

    fn reset(&mut self) {
        self.l = None;
        self.u = None;
        self.state = State::Unset;
    }
}

impl<T: Scalar> Default for NoPivotLu<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One elimination step on a packed LU buffer: store the multipliers of
/// column `k` below the diagonal and update the trailing submatrix.
pub(crate) fn eliminate_below<T: Scalar>(work: &mut Matrix<T>, k: usize) {
    let n = work.cols();
    let pivot = work[(k, k)];
    let (upper, lower) = work.as_mut_slice().split_at_mut((k + 1) * n);
    let pivot_row = &upper[k * n..];
    for row in lower.chunks_exact_mut(n) {
        let l_ik = row[k] / pivot;
        row[k] = l_ik;
        if l_ik == T::zero() {
            continue;
        }
        for (x, &p) in row[k + 1..].iter_mut().zip(&pivot_row[k + 1..]) {
            *x = *x - l_ik * p;
        }
    }
}

impl<T: Scalar> Factorization for NoPivotLu<T> {
    type Input = SquareMatrix<T>;

    fn compute_owned(&mut self, a: SquareMatrix<T>) -> Result<State, LinalgError> {
        self.reset();
        let mut work = a.into_inner();
        let n = work.rows();
        let tol = self.options.threshold(work.max_abs(), n);

        for k in 0..n {
            let pivot = work[(k, k)];
            if pivot.abs() <= tol {
                log::warn!("NoPivotLu: zero pivot {pivot} in column {k} (tolerance {tol})");
                return Err(LinalgError::SingularPivot(k));
            }
            eliminate_below(&mut work, k);
        }

        let (l, u) = split_packed_lu(work);
        self.l = Some(l);
        self.u = Some(u);
        self.state = State::Computed;
        log::debug!("NoPivotLu: factorized {n}x{n} matrix");
        Ok(self.state)
    }

    fn state(&self) -> State {
        self.state
    }

    fn available(&self) -> Factors {
        let mut f = Factors::empty();
        f.set(Factors::L, self.l.is_some());
        f.set(Factors::U, self.u.is_some());
        f
    }
}

impl<T: Scalar> Solve<T> for NoPivotLu<T> {
    fn solve_matrix_inplace(&self, b: &mut Matrix<T>) -> Result<(), LinalgError> {
        let (l, u) = self.factors()?;
        check_rhs(u.size(), b)?;
        forward_substitute_unit_lower(l, b);
        back_substitute_upper(u, b);
        Ok(())
    }
}

impl<T: Scalar> fmt::Display for NoPivotLu<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NoPivotLu ({})", self.state)?;
        if !self.state.is_factored() {
            return Ok(());
        }
        write_factor(f, "L", self.l.as_ref())?;
        write_factor(f, "U", self.u.as_ref())
    }
}
