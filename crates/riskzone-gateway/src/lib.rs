//! `riskzone-gateway` — Risk Zone leaderboard HTTP service.
//!
//! This crate provides the runtime side of the contracts defined in
//! `riskzone-kernel`:
//!
//! | Kernel contract | Implementation |
//! |----------------|----------------|
//! | [`ScoreStore`](riskzone_kernel::leaderboard::ScoreStore) | [`store::InMemoryScoreStore`], `store::SqliteScoreStore` (feature `sqlite`) |
//! | [`RateLimitPolicy`](riskzone_kernel::policy::RateLimitPolicy) | [`middleware::AdmissionController`] |
//! | [`LeaderboardPolicy`](riskzone_kernel::policy::LeaderboardPolicy) | [`service::Leaderboard`], [`server::build_router`] |
//!
//! The [`server::LeaderboardServer`] wires everything together into an axum
//! HTTP service.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use riskzone_gateway::server::LeaderboardServer;
//! use riskzone_kernel::config::ServiceConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServiceConfig::load(Some("riskzone.toml")).unwrap();
//!     LeaderboardServer::new(config).start().await.unwrap();
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod service;
pub mod state;
pub mod store;

// Re-export the kernel for convenience.
pub use riskzone_kernel as kernel;
