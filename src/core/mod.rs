//! Core traits and faer interop.

pub mod traits;
pub mod wrappers;

pub use traits::{Factorization, Factors, MatVec, Scalar, Solve, SolveTarget, State};
