//! Dense direct factorizations and the common solver interface.

use std::fmt;

use crate::utils::convergence::SolveStats;

/// Common interface for a solver that produces `x` from `A` and `b` in one call.
pub trait LinearSolver<M, V> {
    type Error;
    type Scalar: Copy + PartialOrd;
    /// Solve A·x = b, writing result into `x`.
    /// Returns residual stats for the computed solution.
    fn solve(
        &mut self,
        a: &M,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<<Self as LinearSolver<M, V>>::Scalar>, Self::Error>;
}

pub(crate) mod triangular;

pub mod no_pivot_lu;
pub use no_pivot_lu::NoPivotLu;

pub mod row_pivot_lu;
pub use row_pivot_lu::RowPivotLu;

pub mod householder_qr;
pub use householder_qr::HouseholderQr;

/// Render one factor of a factorization, or mark it as stolen.
pub(crate) fn write_factor<D: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    factor: Option<&D>,
) -> fmt::Result {
    match factor {
        Some(m) => {
            writeln!(f, "{name} =")?;
            fmt::Display::fmt(m, f)
        }
        None => writeln!(f, "{name} = (stolen)"),
    }
}
