//! Factory for dense direct solves.
//!
//! `DirectSolver` selects one of the factorizations by [`SolverKind`],
//! factorizes the system matrix, caches the factorization for further
//! right-hand sides, and reports the residual of each solution.
//!
//! # Usage
//!
//! 1. Construct a `DirectSolver` with the desired kind (and optionally tolerances).
//! 2. Call [`LinearSolver::solve`] to factorize `A` and solve `Ax = b`.
//! 3. Call `solve_cached` for further right-hand sides with the same `A`.

use crate::config::{FactorOptions, SolverKind};
use crate::core::traits::{Factorization, Scalar, Solve, State};
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix, Vector};
use crate::solver::{HouseholderQr, LinearSolver, NoPivotLu, RowPivotLu};
use crate::utils::convergence::{Convergence, SolveStats, norm2, residual_norm};

/// A computed factorization of any supported kind.
#[derive(Clone, Debug)]
enum Factor<T> {
    NoPivot(NoPivotLu<T>),
    RowPivot(RowPivotLu<T>),
    Qr(HouseholderQr<T>),
}

impl<T: Scalar> Factor<T> {
    fn state(&self) -> State {
        match self {
            Factor::NoPivot(f) => f.state(),
            Factor::RowPivot(f) => f.state(),
            Factor::Qr(f) => f.state(),
        }
    }

    fn solve_into(&self, b: Vector<T>) -> Result<Vector<T>, LinalgError> {
        match self {
            Factor::NoPivot(f) => f.solve_into(b),
            Factor::RowPivot(f) => f.solve_into(b),
            Factor::Qr(f) => f.solve_into(b),
        }
    }
}

/// Direct solver context: factorization kind, tolerances and the cached factor.
#[derive(Clone, Debug)]
pub struct DirectSolver<T> {
    /// Which factorization to use
    pub kind: SolverKind,
    /// Pivot tolerance handed to the factorization
    pub options: FactorOptions<T>,
    /// Relative residual a solution must reach to count as converged
    pub convergence: Convergence<T>,
    factor: Option<Factor<T>>,
}

impl<T: Scalar> DirectSolver<T> {
    pub fn new(kind: SolverKind) -> Self {
        DirectSolver {
            kind,
            options: FactorOptions::default(),
            convergence: Convergence { tol: T::epsilon().sqrt() },
            factor: None,
        }
    }

    pub fn with_options(mut self, options: FactorOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn with_tolerance(mut self, tol: T) -> Self {
        self.convergence.tol = tol;
        self
    }

    /// State of the cached factorization; `Unset` before the first solve.
    pub fn state(&self) -> State {
        self.factor.as_ref().map_or(State::Unset, Factor::state)
    }

    /// Factorize `a` with the selected method, replacing any cached factor.
    ///
    /// The LU kinds require a square `a`; QR requires `rows >= cols`.
    pub fn factorize(&mut self, a: &Matrix<T>) -> Result<State, LinalgError> {
        self.factor = None;
        let factor = match self.kind {
            SolverKind::NoPivotLu => {
                let mut lu = NoPivotLu::with_options(self.options);
                lu.compute_owned(SquareMatrix::try_from(a.clone())?)?;
                Factor::NoPivot(lu)
            }
            SolverKind::RowPivotLu => {
                let mut lu = RowPivotLu::with_options(self.options);
                lu.compute_owned(SquareMatrix::try_from(a.clone())?)?;
                Factor::RowPivot(lu)
            }
            SolverKind::HouseholderQr => {
                let mut qr = HouseholderQr::with_options(self.options);
                qr.compute(a)?;
                Factor::Qr(qr)
            }
        };
        let state = factor.state();
        self.factor = Some(factor);
        Ok(state)
    }

    /// Solve against the cached factorization.
    ///
    /// Fails with `NotComputed` before the first successful factorization.
    pub fn solve_cached(&self, b: &[T], x: &mut [T]) -> Result<(), LinalgError> {
        let factor = self.factor.as_ref().ok_or(LinalgError::NotComputed)?;
        let sol = factor.solve_into(Vector::from_slice(b))?;
        if sol.len() != x.len() {
            return Err(LinalgError::DimensionMismatch { expected: sol.len(), got: x.len() });
        }
        x.copy_from_slice(sol.as_slice());
        Ok(())
    }
}

impl<T: Scalar> LinearSolver<Matrix<T>, Vec<T>> for DirectSolver<T> {
    type Error = LinalgError;
    type Scalar = T;

    /// Factorize `a`, solve `a·x = b` and report the residual.
    ///
    /// For an overdetermined QR system `x` receives the least-squares
    /// solution and the residual is generally nonzero.
    fn solve(
        &mut self,
        a: &Matrix<T>,
        b: &Vec<T>,
        x: &mut Vec<T>,
    ) -> Result<SolveStats<T>, LinalgError> {
        self.factorize(a)?;
        self.solve_cached(b, x)?;
        let stats = self.convergence.check(residual_norm(a, x, b), norm2(b));
        log::debug!(
            "DirectSolver({}): residual {} (relative {})",
            self.kind,
            stats.final_residual,
            stats.relative_residual
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn system() -> (Matrix<f64>, Vec<f64>) {
        // [[2,1,1],[1,3,2],[1,0,0]] x = [4,5,6], x = [6,15,-23]
        let a = Matrix::from_rows(&[[2.0, 1.0, 1.0], [1.0, 3.0, 2.0], [1.0, 0.0, 0.0]]).unwrap();
        (a, vec![4.0, 5.0, 6.0])
    }

    #[test]
    fn pivoting_kinds_solve_dense_system() {
        let (a, b) = system();
        for kind in [SolverKind::RowPivotLu, SolverKind::HouseholderQr] {
            let mut solver = DirectSolver::new(kind);
            let mut x = vec![0.0; 3];
            let stats = solver.solve(&a, &b, &mut x).unwrap();
            for (xi, ei) in x.iter().zip([6.0, 15.0, -23.0]) {
                assert_abs_diff_eq!(*xi, ei, epsilon = 1e-10);
            }
            assert!(stats.converged, "{kind}: {stats:?}");
            assert_eq!(solver.state(), State::Computed);
        }
    }

    #[test]
    fn no_pivot_kind_reports_zero_pivot() {
        let a = Matrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let mut solver = DirectSolver::new(SolverKind::NoPivotLu);
        let mut x = vec![0.0; 2];
        assert_eq!(solver.solve(&a, &vec![1.0, 2.0], &mut x), Err(LinalgError::SingularPivot(0)));
        assert_eq!(solver.state(), State::Unset);
    }

    #[test]
    fn cached_factor_serves_new_rhs() {
        let (a, b) = system();
        let mut solver = DirectSolver::new(SolverKind::RowPivotLu);
        let mut x = vec![0.0; 3];
        solver.solve(&a, &b, &mut x).unwrap();
        let mut y = vec![0.0; 3];
        solver.solve_cached(&[2.0, 1.0, 1.0], &mut y).unwrap();
        // first column of A, so y = e₀
        for (yi, ei) in y.iter().zip([1.0, 0.0, 0.0]) {
            assert_abs_diff_eq!(*yi, ei, epsilon = 1e-12);
        }
    }

    #[test]
    fn solve_cached_before_factorization_fails() {
        let solver = DirectSolver::<f64>::new(SolverKind::HouseholderQr);
        let mut x = vec![0.0; 2];
        assert_eq!(solver.solve_cached(&[1.0, 2.0], &mut x), Err(LinalgError::NotComputed));
    }

    #[test]
    fn lu_rejects_rectangular_input() {
        let a = Matrix::<f64>::zeros(3, 2);
        let mut solver = DirectSolver::new(SolverKind::RowPivotLu);
        assert!(matches!(solver.factorize(&a), Err(LinalgError::InvalidShape(_))));
    }
}
