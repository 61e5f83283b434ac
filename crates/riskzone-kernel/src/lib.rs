//! `riskzone-kernel` — contracts and pure logic of the Risk Zone leaderboard.
//!
//! This crate owns everything that can be decided without I/O:
//!
//! | Concern | Module |
//! |---------|--------|
//! | Score records and their public projection | [`leaderboard::record`] |
//! | Name alias resolution and field validation | [`leaderboard::submission`] |
//! | Ranking order and limit clamping | [`leaderboard::ranking`] |
//! | Record store contract | [`leaderboard::store`] |
//! | Versioned policy (rate limit, ceiling, CORS) | [`policy`] |
//! | Configuration loading | [`config`] |
//!
//! Concrete stores, the admission controller and the HTTP surface live in
//! `riskzone-gateway`.
//!
//! # Quick start
//!
//! ```rust
//! use riskzone_kernel::leaderboard::ScoreSubmission;
//! use riskzone_kernel::policy::LeaderboardPolicy;
//!
//! let policy = LeaderboardPolicy::default();
//! policy.validate().expect("default policy is valid");
//!
//! let submission: ScoreSubmission =
//!     serde_json::from_str(r#"{"playerName": "Nova", "score": 10}"#).unwrap();
//! let score = submission.validate(policy.score_ceiling).unwrap();
//! assert_eq!(score.name, "Nova");
//! assert_eq!(score.level, 1);
//! ```

#[cfg(feature = "config")]
pub mod config;
pub mod leaderboard;
pub mod policy;
