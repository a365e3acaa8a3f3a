//! Core linear-algebra traits for linfact.

use std::fmt;

use bitflags::bitflags;
use num_traits::Float;

use crate::error::LinalgError;
use crate::matrix::dense::{Matrix, RowVector, Vector};

/// Element type accepted by every container and factorization.
pub trait Scalar: Float + Send + Sync + fmt::Debug + fmt::Display + 'static {}

impl<T> Scalar for T where T: Float + Send + Sync + fmt::Debug + fmt::Display + 'static {}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Lifecycle of a factorization object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum State {
    /// Nothing has been factorized yet, or the last `compute` failed.
    #[default]
    Unset,
    /// The factors are valid and can be used for solving.
    Computed,
    /// The factors are valid, but a pivot (or a diagonal element of R) fell
    /// below the tolerance. Solves are refused.
    Singular,
}

impl State {
    /// True for both `Computed` and `Singular`.
    pub fn is_factored(self) -> bool {
        !matches!(self, State::Unset)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::Unset => "unset",
            State::Computed => "computed",
            State::Singular => "singular",
        };
        f.write_str(s)
    }
}

bitflags! {
    /// Set of factors still owned by a factorization.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Factors: u8 {
        const L = 0b0000_0001;
        const U = 0b0000_0010;
        const P = 0b0000_0100;
        const R = 0b0000_1000;
        /// Householder reflectors (the implicit Q).
        const Q = 0b0001_0000;
        const LU = Self::L.bits() | Self::U.bits();
    }
}

/// Right-hand sides a factorization can solve for.
///
/// `Matrix`, `Vector` and `RowVector` implement it. Solvers only ever change
/// the row count, so a vector stays a vector; a row vector is only accepted
/// by a system with a single row.
pub trait SolveTarget<T> {
    fn as_matrix(&self) -> &Matrix<T>;
    fn as_matrix_mut(&mut self) -> &mut Matrix<T>;
}

impl<T> SolveTarget<T> for Matrix<T> {
    fn as_matrix(&self) -> &Matrix<T> {
        self
    }
    fn as_matrix_mut(&mut self) -> &mut Matrix<T> {
        self
    }
}

impl<T> SolveTarget<T> for Vector<T> {
    fn as_matrix(&self) -> &Matrix<T> {
        self.inner()
    }
    fn as_matrix_mut(&mut self) -> &mut Matrix<T> {
        self.inner_mut()
    }
}

impl<T> SolveTarget<T> for RowVector<T> {
    fn as_matrix(&self) -> &Matrix<T> {
        self.inner()
    }
    fn as_matrix_mut(&mut self) -> &mut Matrix<T> {
        self.inner_mut()
    }
}

/// A matrix factorization with the shared `Unset → Computed` lifecycle.
pub trait Factorization {
    /// Matrix type accepted by `compute`.
    type Input: Clone;

    /// Factorize `a`, reusing its storage as the working buffer.
    fn compute_owned(&mut self, a: Self::Input) -> Result<State, LinalgError>;

    /// Factorize a copy of `a`; the caller keeps the original.
    fn compute(&mut self, a: &Self::Input) -> Result<State, LinalgError> {
        self.compute_owned(a.clone())
    }

    /// Current lifecycle state.
    fn state(&self) -> State;

    /// Factors that have not been stolen yet.
    fn available(&self) -> Factors;
}

/// Solving `A·X = B` against a stored factorization.
///
/// Implementors provide the in-place kernel; the copy and move call forms
/// are derived from it.
pub trait Solve<T: Scalar> {
    /// Overwrite `b` with the solution `X`. Every precondition is checked
    /// before `b` is touched.
    fn solve_matrix_inplace(&self, b: &mut Matrix<T>) -> Result<(), LinalgError>;

    /// Overwrite a matrix or vector right-hand side with the solution.
    fn solve_inplace<B: SolveTarget<T>>(&self, b: &mut B) -> Result<(), LinalgError> {
        self.solve_matrix_inplace(b.as_matrix_mut())
    }

    /// Solve for `b`, reusing its storage for the result.
    fn solve_into<B: SolveTarget<T>>(&self, mut b: B) -> Result<B, LinalgError> {
        self.solve_inplace(&mut b)?;
        Ok(b)
    }

    /// Solve for a copy of `b`; the caller keeps the original.
    fn solve<B: SolveTarget<T> + Clone>(&self, b: &B) -> Result<B, LinalgError> {
        self.solve_into(b.clone())
    }
}
