//! Leaderboard kernel contract.
//!
//! ```text
//! submit:  ScoreSubmission ──validate()──▶ NewScore ──ScoreStore::append──▶ ScoreRecord
//! read:    limit ──clamp_limit()──▶ ScoreStore::query_top_n ──▶ Vec<ScoreRecord> ──▶ Vec<ScoreEntry>
//! ```

pub mod error;
pub mod ranking;
pub mod record;
pub mod store;
pub mod submission;

// ── Flat re-exports ────────────────────────────────────────────────────────

pub use error::{LeaderboardError, LeaderboardResult};
pub use ranking::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, RankKey, clamp_limit, rank};
pub use record::{NewScore, ScoreEntry, ScoreRecord};
pub use store::{ScoreStore, StoreError, StoreResult};
pub use submission::{
    CHARACTER_MAX_LEN, LEVEL_MAX, NAME_ALIASES, NAME_MAX_LEN, SCORE_MAX, ScoreSubmission,
};
