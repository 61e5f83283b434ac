//! Ranking order and snapshot size.

use super::record::ScoreRecord;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Snapshot size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: usize = 10;
/// Smallest snapshot a caller can receive.
pub const MIN_LIMIT: usize = 1;
/// Largest snapshot a caller can receive.
pub const MAX_LIMIT: usize = 50;

/// Clamp a caller-requested snapshot size into `[MIN_LIMIT, MAX_LIMIT]`.
///
/// Out-of-range values are clamped, never rejected. `None` yields
/// [`DEFAULT_LIMIT`].
pub fn clamp_limit(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(MIN_LIMIT as i64, MAX_LIMIT as i64) as usize,
    }
}

/// Sort key of a record on the leaderboard.
///
/// Ascending `RankKey` order is leaderboard order: higher score first, then
/// higher level, then the most recent `created_at`. Records equal on all three
/// fall back to the higher `id`, so every ordering is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankKey {
    pub score: u32,
    pub level: u32,
    pub created_at: DateTime<Utc>,
    pub id: u64,
}

impl RankKey {
    pub fn of(record: &ScoreRecord) -> Self {
        Self {
            score: record.score,
            level: record.level,
            created_at: record.created_at,
            id: record.id,
        }
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.level.cmp(&self.level))
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort records into leaderboard order and keep the best `limit`.
pub fn rank(mut records: Vec<ScoreRecord>, limit: usize) -> Vec<ScoreRecord> {
    records.sort_by_key(RankKey::of);
    records.truncate(limit);
    records
}
