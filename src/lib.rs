//! linfact: dense LU and QR factorizations with explicit ownership
//!
//! This crate provides row-major dense containers, LU factorization without
//! and with partial pivoting, and Householder QR for square and overdetermined
//! systems. Every factorization can be computed from a borrowed matrix (copy)
//! or an owned one (its buffer is reused), solves in place, by copy or by move,
//! and hands out its factors exactly once through `steal_*`.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use crate::core::*;
pub use error::*;
pub use matrix::*;
pub use solver::*;
pub use utils::*;
