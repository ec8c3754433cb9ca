use thiserror::Error;

/// Every way a run can be rejected or abort. None of these are retried; they surface at the
/// boundary that detects them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolveError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("dimension mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("population is empty")]
    EmptyPopulation,
}

pub type Result<T> = core::result::Result<T, EvolveError>;
