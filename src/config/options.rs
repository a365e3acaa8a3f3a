//! Tolerance and solver-selection options.
//!
//! `FactorOptions` controls when a pivot (or a diagonal element of R) counts
//! as numerically zero. The threshold is relative to the scale of the input:
//!
//! `tol = pivot_tol · max(rows, cols) · max|aᵢⱼ|`
//!
//! and a pivot `p` is degenerate when `|p| <= tol`. `SolverKind` selects a
//! factorization by name, e.g. from a command-line flag.

use std::fmt;
use std::str::FromStr;

use num_traits::{Float, NumCast};

/// Factorization tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorOptions<T> {
    /// Relative pivot tolerance, multiplied by the matrix dimension and its
    /// largest absolute element.
    pub pivot_tol: T,
}

impl<T: Float> Default for FactorOptions<T> {
    fn default() -> Self {
        FactorOptions { pivot_tol: T::epsilon() }
    }
}

impl<T: Float> FactorOptions<T> {
    pub fn with_pivot_tol(mut self, pivot_tol: T) -> Self {
        self.pivot_tol = pivot_tol;
        self
    }

    /// Absolute threshold for an input whose largest element is `scale`.
    pub fn threshold(&self, scale: T, dim: usize) -> T {
        let dim: T = <T as NumCast>::from(dim).unwrap_or_else(T::infinity);
        self.pivot_tol * dim * scale
    }
}

/// Available direct factorizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    /// LU without row exchanges
    NoPivotLu,
    /// LU with partial (row) pivoting
    RowPivotLu,
    /// Householder QR, also handles overdetermined systems
    HouseholderQr,
}

impl FromStr for SolverKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nopivot-lu" | "nopivotlu" => Ok(SolverKind::NoPivotLu),
            "lu" | "row-pivot-lu" | "rowpivotlu" => Ok(SolverKind::RowPivotLu),
            "qr" | "householder-qr" | "householderqr" => Ok(SolverKind::HouseholderQr),
            other => Err(format!("unknown solver kind '{other}'")),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolverKind::NoPivotLu => "nopivot-lu",
            SolverKind::RowPivotLu => "row-pivot-lu",
            SolverKind::HouseholderQr => "householder-qr",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_scales_with_dimension_and_magnitude() {
        let opts = FactorOptions::<f64>::default();
        assert_eq!(opts.threshold(2.0, 3), f64::EPSILON * 6.0);
        assert_eq!(opts.threshold(0.0, 3), 0.0);
        let loose = opts.with_pivot_tol(1e-3);
        assert_eq!(loose.threshold(1.0, 1), 1e-3);
    }

    #[test]
    fn solver_kind_parses_and_displays() {
        assert_eq!("QR".parse::<SolverKind>(), Ok(SolverKind::HouseholderQr));
        assert_eq!("lu".parse::<SolverKind>(), Ok(SolverKind::RowPivotLu));
        assert_eq!("nopivot-lu".parse::<SolverKind>(), Ok(SolverKind::NoPivotLu));
        assert!("cholesky".parse::<SolverKind>().is_err());
        for kind in [SolverKind::NoPivotLu, SolverKind::RowPivotLu, SolverKind::HouseholderQr] {
            assert_eq!(kind.to_string().parse::<SolverKind>(), Ok(kind));
        }
    }
}
