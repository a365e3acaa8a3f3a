use thiserror::Error;

// Unified error type for linfact

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("zero pivot in column {0}")]
    SingularPivot(usize),
    #[error("singular matrix: pivot in column {0} is below tolerance")]
    SingularMatrix(usize),
    #[error("rank deficient matrix: diagonal of R in column {0} is below tolerance")]
    RankDeficient(usize),
    #[error("factorization has not been computed")]
    NotComputed,
    #[error("factor {0} is unavailable (it was stolen)")]
    FactorUnavailable(&'static str),
    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),
}

impl LinalgError {
    /// Shape error for an `expected` shape description and an actual `rows`×`cols`.
    pub(crate) fn shape(expected: &str, rows: usize, cols: usize) -> Self {
        LinalgError::InvalidShape(format!("expected {expected}, got {rows}x{cols}"))
    }
}
