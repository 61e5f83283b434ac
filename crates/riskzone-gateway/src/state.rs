//! Shared application state for the leaderboard server

use crate::middleware::AdmissionController;
use crate::service::Leaderboard;
use riskzone_kernel::leaderboard::ScoreStore;
use riskzone_kernel::policy::LeaderboardPolicy;
use std::sync::Arc;

/// State shared across all request handlers
pub struct AppState {
    /// Ranked read/write paths over the score store
    pub leaderboard: Leaderboard,
    /// Per-origin write admission
    pub admission: Arc<AdmissionController>,
    /// Policy the service was started with
    pub policy: LeaderboardPolicy,
}

impl AppState {
    /// Build state from a validated policy and an opened store.
    pub fn new(policy: LeaderboardPolicy, store: Arc<dyn ScoreStore>) -> Self {
        Self {
            leaderboard: Leaderboard::new(store, policy.score_ceiling),
            admission: Arc::new(AdmissionController::from_policy(&policy.rate_limit)),
            policy,
        }
    }
}
