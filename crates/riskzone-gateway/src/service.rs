//! Leaderboard read and write paths over a [`ScoreStore`].
//!
//! Admission control is not checked here; the HTTP layer consults the
//! [`AdmissionController`](crate::middleware::AdmissionController) before
//! calling [`Leaderboard::submit`].

use chrono::Utc;
use riskzone_kernel::leaderboard::{
    LeaderboardError, LeaderboardResult, ScoreRecord, ScoreStore, ScoreSubmission, clamp_limit,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn ScoreStore>,
    score_ceiling: u32,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn ScoreStore>, score_ceiling: u32) -> Self {
        Self {
            store,
            score_ceiling,
        }
    }

    /// Best-ranked records, at most `clamp_limit(requested)` of them.
    pub async fn top_n(&self, requested: Option<i64>) -> LeaderboardResult<Vec<ScoreRecord>> {
        let limit = clamp_limit(requested);
        self.store.query_top_n(limit).await.map_err(|e| {
            error!(error = %e, limit, "leaderboard query failed");
            LeaderboardError::from(e)
        })
    }

    /// Validate and persist `submission`, then return the refreshed snapshot.
    ///
    /// Rejected submissions never reach the store.
    pub async fn submit(
        &self,
        submission: &ScoreSubmission,
        requested: Option<i64>,
    ) -> LeaderboardResult<Vec<ScoreRecord>> {
        let score = submission
            .validate(self.score_ceiling)
            .inspect_err(|e| match e {
                LeaderboardError::ScoreOutOfRange { score, ceiling } => {
                    warn!(score, ceiling, "score rejected by anti-abuse ceiling")
                }
                other => debug!(reason = %other, "score submission rejected"),
            })?;

        let record = self.store.append(score, Utc::now()).await.map_err(|e| {
            error!(error = %e, "failed to persist score");
            LeaderboardError::from(e)
        })?;

        info!(
            id = record.id,
            name = %record.name,
            score = record.score,
            level = record.level,
            "score recorded"
        );

        self.top_n(requested).await
    }
}
