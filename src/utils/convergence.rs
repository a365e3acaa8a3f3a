//! Residual checks for direct solves.
//!
//! A direct solver has nothing to iterate, so "convergence" here means the
//! computed `x` actually satisfies the system: the relative residual
//! `‖b − A·x‖ / ‖b‖` is compared against a tolerance.

use num_traits::Float;

use crate::core::traits::MatVec;

/// Acceptance criterion for a computed solution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence<T> {
    pub tol: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    /// ‖b − A·x‖₂
    pub final_residual: T,
    /// ‖b − A·x‖₂ / ‖b‖₂, or the absolute residual when `b = 0`
    pub relative_residual: T,
    pub converged: bool,
}

impl<T: Float> Convergence<T> {
    /// Build the stats of a single direct solve from its residual and rhs norms.
    pub fn check(&self, res_norm: T, rhs_norm: T) -> SolveStats<T> {
        let rel = if rhs_norm > T::zero() { res_norm / rhs_norm } else { res_norm };
        SolveStats {
            final_residual: res_norm,
            relative_residual: rel,
            converged: rel <= self.tol,
        }
    }
}

/// ‖x‖₂ of a slice.
pub fn norm2<T: Float>(x: &[T]) -> T {
    x.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
}

/// ‖b − A·x‖₂.
pub fn residual_norm<T, M>(a: &M, x: &Vec<T>, b: &Vec<T>) -> T
where
    T: Float,
    M: MatVec<Vec<T>>,
{
    let mut ax = vec![T::zero(); b.len()];
    a.matvec(x, &mut ax);
    let r: Vec<T> = b.iter().zip(&ax).map(|(&bi, &axi)| bi - axi).collect();
    norm2(&r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::dense::Matrix;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_solution_has_zero_residual() {
        let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 4.0]]).unwrap();
        let r = residual_norm(&a, &vec![1.0, 0.5], &vec![2.0, 2.0]);
        assert_eq!(r, 0.0);
    }

    #[test]
    fn stats_use_relative_residual() {
        let conv = Convergence { tol: 1e-8 };
        let stats = conv.check(1e-6, 10.0);
        assert_abs_diff_eq!(stats.relative_residual, 1e-7, epsilon = 1e-20);
        assert!(!stats.converged);

        let zero_rhs = conv.check(0.0, 0.0);
        assert!(zero_rhs.converged);
    }
}
