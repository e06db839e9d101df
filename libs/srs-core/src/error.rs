//! Error types for srs-core.

use thiserror::Error;

/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the scheduling engine. These are programmer errors
/// (bad configuration), not runtime conditions: short candidate supply and
/// store failures are handled silently per the session contract.
#[derive(Debug, Error)]
pub enum Error {
    #[error("desired retention must be within (0, 1), got {0}")]
    RetentionOutOfRange(f64),

    #[error("learning steps must be positive and ascending, got {0:?}")]
    InvalidLearningSteps([i64; 2]),

    #[error("interval bounds must satisfy 1 <= min <= max, got [{min}, {max}]")]
    InvalidIntervalBounds { min: i64, max: i64 },

    #[error("graduation interval must exceed the last learning step")]
    InvalidGraduationInterval,

    #[error("initial stability seeds must be positive")]
    InvalidStabilitySeed,

    #[error("initial difficulty seeds must be within [0, 10]")]
    InvalidDifficultySeed,

    #[error("session must request at least one question")]
    EmptySession,

    #[error("review ratio must be within [0, 1], got {0}")]
    ReviewRatioOutOfRange(f64),
}

/// Failure reported by a `ProgressStore` implementation.
///
/// The core never propagates these out of session composition; they are
/// logged and degrade to empty candidate pools.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),
}
