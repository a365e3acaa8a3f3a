//! Small numerical helpers shared by the solver front ends.

pub mod convergence;
pub use convergence::{Convergence, SolveStats, norm2, residual_norm};
