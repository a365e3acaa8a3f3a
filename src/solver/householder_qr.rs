//! QR factorization by Householder reflections.
//!
//! An `m × n` matrix with `m ≥ n` is reduced to upper-trapezoidal `R` by `n`
//! reflections `Hₖ = I − wₖ·wₖᵀ`, so that `Hₙ₋₁ ⋯ H₀ · A = R` and
//! `Q = H₀ ⋯ Hₙ₋₁`. `Q` is never formed: each `wₖ` is kept in column `k` of
//! an `m × n` buffer (rows `k..m`) and replayed on demand, forward for `Qᵀ`
//! and backward for `Q`.
//!
//! The reflector vectors are scaled to norm `√2`. The diagonal of `R` is kept
//! separately in `r_diag`, since the reflector occupies that slot.

use std::fmt;

use crate::config::FactorOptions;
use crate::core::traits::{Factorization, Factors, Scalar, Solve, SolveTarget, State};
use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, SquareMatrix};
use crate::solver::triangular::{back_substitute_upper, check_rhs};
use crate::solver::write_factor;

/// Householder QR factorization `A = Q·R` of a matrix with at least as many
/// rows as columns.
#[derive(Clone, Debug)]
pub struct HouseholderQr<T> {
    w: Option<Matrix<T>>,
    r: Option<Matrix<T>>,
    r_diag: Vec<T>,
    rank_deficient_at: Option<usize>,
    state: State,
    options: FactorOptions<T>,
}

impl<T: Scalar> HouseholderQr<T> {
    /// Create an empty factorization (state `Unset`).
    pub fn new() -> Self {
        Self::with_options(FactorOptions::default())
    }

    pub fn with_options(options: FactorOptions<T>) -> Self {
        HouseholderQr {
            w: None,
            r: None,
            r_diag: Vec::new(),
            rank_deficient_at: None,
            state: State::Unset,
            options,
        }
    }

    /// Factorize a copy of `a`.
    pub fn from_matrix(a: &Matrix<T>) -> Result<Self, LinalgError> {
        let mut qr = Self::new();
        qr.compute(a)?;
        Ok(qr)
    }

    /// Factorize `a`, reusing its storage for the reflectors.
    pub fn from_owned(a: Matrix<T>) -> Result<Self, LinalgError> {
        let mut qr = Self::new();
        qr.compute_owned(a)?;
        Ok(qr)
    }

    pub fn options(&self) -> &FactorOptions<T> {
        &self.options
    }

    /// The `m × n` upper-trapezoidal factor, if computed and not stolen.
    pub fn r(&self) -> Option<&Matrix<T>> {
        self.r.as_ref()
    }

    /// Reflector vectors: column `k` holds `wₖ` in rows `k..m`, zeros above.
    pub fn reflectors(&self) -> Option<&Matrix<T>> {
        self.w.as_ref()
    }

    /// Diagonal of `R`.
    pub fn r_diag(&self) -> &[T] {
        &self.r_diag
    }

    /// First column whose diagonal element of `R` fell below the tolerance.
    pub fn rank_deficient_column(&self) -> Option<usize> {
        self.rank_deficient_at
    }

    /// Take ownership of `R`. Solves fail afterwards; `apply_q` and
    /// `apply_qt` keep working.
    pub fn steal_r(&mut self) -> Result<Matrix<T>, LinalgError> {
        self.ensure_factored()?;
        log::trace!("HouseholderQr: stealing R");
        self.r.take().ok_or(LinalgError::FactorUnavailable("R"))
    }

    /// Overwrite `b` with `Qᵀ·b`.
    pub fn apply_qt_inplace<B: SolveTarget<T>>(&self, b: &mut B) -> Result<(), LinalgError> {
        let w = self.reflectors_checked(b.as_matrix())?;
        let b = b.as_matrix_mut();
        let mut dots = vec![T::zero(); b.cols()];
        for k in 0..w.cols() {
            reflect(w, k, b, &mut dots);
        }
        Ok(())
    }

    /// `Qᵀ·b`, reusing the storage of `b`.
    pub fn apply_qt_into<B: SolveTarget<T>>(&self, mut b: B) -> Result<B, LinalgError> {
        self.apply_qt_inplace(&mut b)?;
        Ok(b)
    }

    /// `Qᵀ·b` for a copy of `b`.
    pub fn apply_qt<B: SolveTarget<T> + Clone>(&self, b: &B) -> Result<B, LinalgError> {
        self.apply_qt_into(b.clone())
    }

    /// Overwrite `b` with `Q·b`.
    pub fn apply_q_inplace<B: SolveTarget<T>>(&self, b: &mut B) -> Result<(), LinalgError> {
        let w = self.reflectors_checked(b.as_matrix())?;
        let b = b.as_matrix_mut();
        let mut dots = vec![T::zero(); b.cols()];
        for k in (0..w.cols()).rev() {
            reflect(w, k, b, &mut dots);
        }
        Ok(())
    }

    /// `Q·b`, reusing the storage of `b`.
    pub fn apply_q_into<B: SolveTarget<T>>(&self, mut b: B) -> Result<B, LinalgError> {
        self.apply_q_inplace(&mut b)?;
        Ok(b)
    }

    /// `Q·b` for a copy of `b`.
    pub fn apply_q<B: SolveTarget<T> + Clone>(&self, b: &B) -> Result<B, LinalgError> {
        self.apply_q_into(b.clone())
    }

    /// Dense `m × m` orthogonal factor. Diagnostic only; solves never build it.
    pub fn q(&self) -> Result<SquareMatrix<T>, LinalgError> {
        let m = self.w.as_ref().ok_or(LinalgError::NotComputed)?.rows();
        let q = self.apply_q_into(Matrix::identity(m))?;
        Ok(SquareMatrix::new_unchecked(q))
    }

    fn ensure_factored(&self) -> Result<(), LinalgError> {
        if self.state.is_factored() {
            Ok(())
        } else {
            Err(LinalgError::NotComputed)
        }
    }

    fn reflectors_checked(&self, b: &Matrix<T>) -> Result<&Matrix<T>, LinalgError> {
        self.ensure_factored()?;
        let w = self.w.as_ref().ok_or(LinalgError::FactorUnavailable("Q"))?;
        check_rhs(w.rows(), b)?;
        Ok(w)
    }

    fn reset(&mut self) {
        self.w = None;
        self.r = None;
        self.r_diag.clear();
        self.rank_deficient_at = None;
        self.state = State::Unset;
    }
}

impl<T: Scalar> Default for HouseholderQr<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `H = I − wₖ·wₖᵀ` to `b` (rows `k..m` only; `wₖ` is zero above `k`).
fn reflect<T: Scalar>(w: &Matrix<T>, k: usize, b: &mut Matrix<T>, dots: &mut [T]) {
    dots.iter_mut().for_each(|d| *d = T::zero());
    for i in k..w.rows() {
        let w_i = w[(i, k)];
        for (d, &x) in dots.iter_mut().zip(b.row(i)) {
            *d = *d + w_i * x;
        }
    }
    for i in k..w.rows() {
        let w_i = w[(i, k)];
        for (x, &d) in b.row_mut(i).iter_mut().zip(dots.iter()) {
            *x = *x - w_i * d;
        }
    }
}

impl<T: Scalar> Factorization for HouseholderQr<T> {
    type Input = Matrix<T>;

    fn compute_owned(&mut self, a: Matrix<T>) -> Result<State, LinalgError> {
        self.reset();
        let (m, n) = a.shape();
        if m < n {
            return Err(LinalgError::shape("rows >= cols", m, n));
        }
        let mut work = a;
        let tol = self.options.threshold(work.max_abs(), m);
        let sqrt2 = (T::one() + T::one()).sqrt();
        let tiny = T::min_positive_value() + T::min_positive_value();
        let mut r_diag = vec![T::zero(); n];
        let mut dots = vec![T::zero(); n];
        let mut rank_deficient_at = None;

        for k in 0..n {
            let sq_norm = (k..m).fold(T::zero(), |acc, i| acc + work[(i, k)] * work[(i, k)]);
            let norm = sq_norm.sqrt();
            let x0 = work[(k, k)];

            if norm < tiny {
                for i in k..m {
                    work[(i, k)] = T::zero();
                }
                work[(k, k)] = sqrt2;
                r_diag[k] = T::zero();
            } else {
                // reflect onto the side opposite x0 to avoid cancellation
                let x_p = if x0.is_sign_negative() { norm } else { -norm };
                let scale = (x0.abs() * norm + sq_norm).sqrt();
                work[(k, k)] = x0 - x_p;
                for i in k..m {
                    work[(i, k)] = work[(i, k)] / scale;
                }
                r_diag[k] = x_p;
            }

            if r_diag[k].abs() <= tol && rank_deficient_at.is_none() {
                log::warn!(
                    "HouseholderQr: diagonal of R in column {k} is {} (tolerance {tol})",
                    r_diag[k]
                );
                rank_deficient_at = Some(k);
            }

            // trailing columns: A[k.., k+1..] -= w (wᵀ A[k.., k+1..])
            let dots = &mut dots[k + 1..];
            dots.iter_mut().for_each(|d| *d = T::zero());
            for i in k..m {
                let row = work.row(i);
                let w_i = row[k];
                for (d, &x) in dots.iter_mut().zip(&row[k + 1..]) {
                    *d = *d + w_i * x;
                }
            }
            for i in k..m {
                let row = work.row_mut(i);
                let w_i = row[k];
                for (x, &d) in row[k + 1..].iter_mut().zip(dots.iter()) {
                    *x = *x - w_i * d;
                }
            }
        }

        let mut r = Matrix::zeros(m, n);
        for i in 0..n {
            r[(i, i)] = r_diag[i];
            for j in i + 1..n {
                r[(i, j)] = work[(i, j)];
                work[(i, j)] = T::zero();
            }
        }

        self.w = Some(work);
        self.r = Some(r);
        self.r_diag = r_diag;
        self.rank_deficient_at = rank_deficient_at;
        self.state = if rank_deficient_at.is_some() { State::Singular } else { State::Computed };
        log::debug!("HouseholderQr: factorized {m}x{n} matrix, state {}", self.state);
        Ok(self.state)
    }

    fn state(&self) -> State {
        self.state
    }

    fn available(&self) -> Factors {
        let mut f = Factors::empty();
        f.set(Factors::Q, self.w.is_some());
        f.set(Factors::R, self.r.is_some());
        f
    }
}

impl<T: Scalar> Solve<T> for HouseholderQr<T> {
    /// Least-squares solution of `A·X ≈ B`. `B` has `m` rows on entry and `n`
    /// rows on return.
    fn solve_matrix_inplace(&self, b: &mut Matrix<T>) -> Result<(), LinalgError> {
        self.ensure_factored()?;
        let r = self.r.as_ref().ok_or(LinalgError::FactorUnavailable("R"))?;
        if let Some(k) = self.rank_deficient_at {
            return Err(LinalgError::RankDeficient(k));
        }
        check_rhs(r.rows(), b)?;
        self.apply_qt_inplace(b)?;
        back_substitute_upper(r, b);
        b.truncate_rows(r.cols());
        Ok(())
    }
}

impl<T: Scalar> fmt::Display for HouseholderQr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HouseholderQr ({})", self.state)?;
        if !self.state.is_factored() {
            return Ok(());
        }
        write_factor(f, "Q", self.q().ok().as_ref())?;
        write_factor(f, "R", self.r.as_ref())
    }
}
