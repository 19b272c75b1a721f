use thiserror::Error;

/// Errors raised by the scoring core.
///
/// `NotFound` is reserved for "not yet judged": a missing result must never
/// be mistaken for a legitimate zero score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authorization error: {0}")]
    Authorization(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
