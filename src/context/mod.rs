//! Context module for linfact.
//!
//! Contexts encapsulate algorithm selection and parameter management on top
//! of the individual factorizations.
//!
//! Modules:
//! - [`direct_context`]: the `DirectSolver` factory for one-call dense solves.
//!
//! # Example
//! ```rust
//! use linfact::{DirectSolver, LinearSolver, Matrix, SolverKind};
//! let a = Matrix::from_rows(&[[4.0, 3.0], [6.0, 3.0]]).unwrap();
//! let mut solver = DirectSolver::new(SolverKind::RowPivotLu);
//! let mut x = vec![0.0; 2];
//! let stats = solver.solve(&a, &vec![1.0, 1.0], &mut x).unwrap();
//! assert!(stats.converged);
//! ```

pub mod direct_context;
pub use direct_context::DirectSolver;
