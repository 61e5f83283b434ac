//! Leaderboard error taxonomy.
//!
//! Caller-input faults ([`Validation`](LeaderboardError::Validation),
//! [`ScoreOutOfRange`](LeaderboardError::ScoreOutOfRange),
//! [`RateLimitExceeded`](LeaderboardError::RateLimitExceeded)) are detected
//! before any mutation. [`StoreUnavailable`](LeaderboardError::StoreUnavailable)
//! is the only operational fault.

use super::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LeaderboardError {
    /// Malformed or out-of-bounds input, including an unresolved name.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// Score passes field validation but exceeds the anti-abuse ceiling.
    #[error("score {score} exceeds the ceiling of {ceiling}")]
    ScoreOutOfRange { score: u32, ceiling: u32 },

    /// The admission controller rejected the origin for the current window.
    #[error("rate limit exceeded for origin '{origin}', retry in {retry_after_secs}s")]
    RateLimitExceeded {
        origin: String,
        retry_after_secs: u64,
    },

    /// The record store could not be read or written.
    #[error("score store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LeaderboardError {
    /// Construct a validation error from any displayable reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// `true` for operational faults, `false` for caller-input faults.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for LeaderboardError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}

pub type LeaderboardResult<T> = Result<T, LeaderboardError>;
