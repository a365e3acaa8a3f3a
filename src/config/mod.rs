//! Configuration for factorizations and the direct-solver context.

pub mod options;
pub use options::{FactorOptions, SolverKind};
