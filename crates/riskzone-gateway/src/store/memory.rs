//! In-memory score store
//!
//! Suitable for tests, development, and deployments where scores only need to
//! survive the process lifetime.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use riskzone_kernel::leaderboard::{
    NewScore, RankKey, ScoreRecord, ScoreStore, StoreError, StoreResult,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Ranked {
    /// Records kept in leaderboard order.
    by_rank: BTreeMap<RankKey, ScoreRecord>,
    next_id: u64,
    last_created_at: Option<DateTime<Utc>>,
}

/// Thread-safe in-memory [`ScoreStore`].
///
/// Records are indexed by [`RankKey`], so a top-N read walks the first `N`
/// entries instead of sorting. Appends take the write lock and reads the read
/// lock; a read issued after `append` returns always sees the record.
pub struct InMemoryScoreStore {
    ranked: RwLock<Ranked>,
    connected: AtomicBool,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self {
            ranked: RwLock::new(Ranked {
                next_id: 1,
                ..Default::default()
            }),
            connected: AtomicBool::new(true),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Simulate losing (`false`) or regaining (`true`) the backend.
    ///
    /// While disconnected every operation fails with
    /// [`StoreError::Connection`] and nothing is written.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    fn ensure_connected(&self) -> StoreResult<()> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Connection("in-memory store is disconnected".to_string()))
        }
    }
}

impl Default for InMemoryScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn append(&self, score: NewScore, now: DateTime<Utc>) -> StoreResult<ScoreRecord> {
        self.ensure_connected()?;
        let mut ranked = self.ranked.write().await;

        // Keep created_at non-decreasing even if the wall clock steps back.
        let created_at = ranked.last_created_at.map_or(now, |last| last.max(now));
        let id = ranked.next_id;
        let record = ScoreRecord::from_new(id, score, created_at);

        ranked.next_id += 1;
        ranked.last_created_at = Some(created_at);
        ranked.by_rank.insert(RankKey::of(&record), record.clone());
        Ok(record)
    }

    async fn query_top_n(&self, limit: usize) -> StoreResult<Vec<ScoreRecord>> {
        self.ensure_connected()?;
        let ranked = self.ranked.read().await;
        Ok(ranked.by_rank.values().take(limit).cloned().collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        self.ensure_connected()?;
        Ok(self.ranked.read().await.by_rank.len() as u64)
    }
}
