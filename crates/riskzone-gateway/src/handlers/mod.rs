//! Request handlers for the leaderboard API

pub mod health;
pub mod leaderboard;

pub use health::health_router;
pub use leaderboard::leaderboard_router;
