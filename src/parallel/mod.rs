//! Shared-memory parallelism: batches of independent systems.
//!
//! Every system gets its own factorization, so nothing is shared between
//! tasks. With the `rayon` feature the batch runs on the global rayon pool,
//! otherwise serially; results come back in input order either way.

use crate::config::SolverKind;
use crate::core::traits::Scalar;
use crate::context::DirectSolver;
use crate::error::LinalgError;
use crate::matrix::dense::Matrix;
use crate::solver::LinearSolver;
use crate::utils::convergence::SolveStats;

/// Solution vector and residual stats of one system.
pub type BatchResult<T> = Result<(Vec<T>, SolveStats<T>), LinalgError>;

/// Size the global rayon pool to the number of logical CPUs.
///
/// Returns the number of worker threads. Only the first call configures the
/// pool; later calls (or a pool built elsewhere) leave it unchanged.
pub fn init_thread_pool() -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "rayon"))]
    {
        1
    }
}

fn solve_one<T: Scalar>(kind: SolverKind, a: &Matrix<T>, b: &Vec<T>) -> BatchResult<T> {
    let mut solver = DirectSolver::new(kind);
    let mut x = vec![T::zero(); a.cols()];
    let stats = solver.solve(a, b, &mut x)?;
    Ok((x, stats))
}

/// Solve each `(A, b)` pair with a fresh factorization of the given kind.
pub fn solve_batch<T: Scalar>(
    kind: SolverKind,
    systems: &[(Matrix<T>, Vec<T>)],
) -> Vec<BatchResult<T>> {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        systems.par_iter().map(|(a, b)| solve_one(kind, a, b)).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        systems.iter().map(|(a, b)| solve_one(kind, a, b)).collect()
    }
}
