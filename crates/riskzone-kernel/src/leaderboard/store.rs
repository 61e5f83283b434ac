//! Record store contract.
//!
//! Defines the interface a leaderboard backend must implement. The ranking
//! rule itself lives in [`ranking`](super::ranking); a backend only has to
//! return records in [`RankKey`](super::RankKey) order.

use super::record::{NewScore, ScoreRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Store error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend cannot be reached.
    #[error("connection error: {0}")]
    Connection(String),
    /// A read or write statement failed.
    #[error("query error: {0}")]
    Query(String),
    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered, append-only score store.
///
/// Implementations must guarantee:
/// - `append` either fully persists the record or leaves the store unchanged.
/// - A `query_top_n` issued after `append` returns observes the new record.
/// - `created_at` of stored records is non-decreasing in insertion order, even
///   if the supplied `now` goes backwards.
/// - Identifiers are unique and never reused.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Persist a validated score stamped with `now`.
    async fn append(&self, score: NewScore, now: DateTime<Utc>) -> StoreResult<ScoreRecord>;

    /// Return at most `limit` records in ranking order.
    ///
    /// `limit` is taken as given; callers clamp it first.
    async fn query_top_n(&self, limit: usize) -> StoreResult<Vec<ScoreRecord>>;

    /// Total number of stored records.
    async fn count(&self) -> StoreResult<u64>;
}
