//! Matrix module: dense containers and permutations.

pub mod dense;
pub use dense::{Matrix, RowVector, SquareMatrix, Vector};
pub mod permutation;
pub use permutation::PermutationMatrix;
