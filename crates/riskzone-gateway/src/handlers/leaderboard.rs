//! Leaderboard endpoints
//!
//! GET  /leaderboard?limit=N  - ranked top-N snapshot
//! POST /score?limit=N        - submit a score, returns the refreshed snapshot

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
};
use riskzone_kernel::leaderboard::{LeaderboardError, ScoreEntry, ScoreRecord, ScoreSubmission};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::error::GatewayResult;
use crate::middleware::{Admission, ClientOrigin};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Query string shared by both endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    /// Requested snapshot size; clamped to [1, 50], default 10
    pub limit: Option<i64>,
}

fn limit_from(query: Result<Query<LimitQuery>, QueryRejection>) -> GatewayResult<Option<i64>> {
    let Query(query) = query.map_err(|e| LeaderboardError::validation(e.body_text()))?;
    Ok(query.limit)
}

fn entries(records: &[ScoreRecord]) -> Json<Vec<ScoreEntry>> {
    Json(records.iter().map(ScoreEntry::from).collect())
}

fn whole_seconds(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /leaderboard
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> GatewayResult<Json<Vec<ScoreEntry>>> {
    let limit = limit_from(query)?;
    let records = state.leaderboard.top_n(limit).await?;
    Ok(entries(&records))
}

/// POST /score
///
/// The origin is admitted before the body is even parsed, so malformed
/// submissions still count against the origin's window.
pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    origin: ClientOrigin,
    query: Result<Query<LimitQuery>, QueryRejection>,
    body: Bytes,
) -> GatewayResult<Json<Vec<ScoreEntry>>> {
    if let Admission::Reject { retry_after } =
        state.admission.check_and_record(origin.as_str(), Instant::now())
    {
        warn!(origin = %origin, retry_after_ms = retry_after.as_millis() as u64, "rate limit exceeded");
        return Err(LeaderboardError::RateLimitExceeded {
            origin: origin.0,
            retry_after_secs: whole_seconds(retry_after),
        }
        .into());
    }

    let limit = limit_from(query)?;
    let submission: ScoreSubmission = serde_json::from_slice(&body)
        .map_err(|e| LeaderboardError::validation(format!("invalid score payload: {e}")))?;

    let records = state.leaderboard.submit(&submission, limit).await?;
    Ok(entries(&records))
}

/// Build the leaderboard router sub-tree
pub fn leaderboard_router() -> axum::Router<Arc<AppState>> {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/score", post(submit_score))
}
