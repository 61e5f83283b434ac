//! Axum-based HTTP leaderboard server.
//!
//! [`LeaderboardServer`] opens the score store, builds the shared state and
//! serves the router until Ctrl+C.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Service banner. |
//! | `GET`  | `/health` | Liveness check — always `200 OK`. |
//! | `GET`  | `/version` | Active policy version. |
//! | `GET`  | `/leaderboard?limit=N` | Ranked top-N snapshot. |
//! | `POST` | `/score?limit=N` | Rate-limited score submission. |

use crate::error::GatewayResult;
use crate::handlers::{health_router, leaderboard_router};
use crate::middleware::AdmissionController;
use crate::state::AppState;
use crate::store::open_store;
use axum::{
    Router,
    http::{HeaderValue, Method, request::Parts},
};
use riskzone_kernel::config::{ConfigError, ServiceConfig};
use riskzone_kernel::policy::{CorsPolicy, PolicyError};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the full application router over `state`.
pub fn build_router(state: Arc<AppState>) -> GatewayResult<Router> {
    let cors = cors_layer(&state.policy.cors).map_err(ConfigError::from)?;

    Ok(Router::new()
        .merge(health_router())
        .merge(leaderboard_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// CORS layer admitting the policy's origins with credentials.
pub fn cors_layer(policy: &CorsPolicy) -> Result<CorsLayer, PolicyError> {
    let matcher = policy.matcher()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|o| matcher.allows(o))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

// ─────────────────────────────────────────────────────────────────────────────
// Background maintenance
// ─────────────────────────────────────────────────────────────────────────────

/// Periodically drop expired rate-limit buckets.
pub fn spawn_sweeper(admission: Arc<AdmissionController>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = admission.sweep(Instant::now());
            if removed > 0 {
                debug!(
                    removed,
                    remaining = admission.tracked_origins(),
                    "swept expired rate-limit buckets"
                );
            }
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// LeaderboardServer
// ─────────────────────────────────────────────────────────────────────────────

pub struct LeaderboardServer {
    config: ServiceConfig,
}

impl LeaderboardServer {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Open the store and assemble the shared state.
    pub async fn build_state(&self) -> GatewayResult<Arc<AppState>> {
        self.config.policy.validate().map_err(ConfigError::from)?;
        let store = open_store(self.config.server.database_url.as_deref()).await?;
        Ok(Arc::new(AppState::new(self.config.policy.clone(), store)))
    }

    /// Bind to the configured address and serve until Ctrl+C.
    pub async fn start(self) -> GatewayResult<()> {
        let state = self.build_state().await?;
        let app = build_router(Arc::clone(&state))?;
        let sweeper = spawn_sweeper(
            Arc::clone(&state.admission),
            self.config.policy.rate_limit.sweep_interval(),
        );

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let backend = match self.config.server.database_url {
            Some(_) => "sqlite",
            None => "memory",
        };
        info!(
            addr = %addr,
            policy_version = %self.config.policy.version,
            store = backend,
            "Risk Zone leaderboard starting"
        );

        let served = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        sweeper.abort();
        served?;
        info!("Risk Zone leaderboard stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down gracefully...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryScoreStore;
    use riskzone_kernel::policy::{LeaderboardPolicy, RateLimitPolicy};

    #[tokio::test(start_paused = true)]
    async fn sweeper_evicts_idle_origins() {
        let admission = Arc::new(AdmissionController::new(5, Duration::from_secs(60)));
        admission.check_and_record("idle", Instant::now());
        let handle = spawn_sweeper(Arc::clone(&admission), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(admission.tracked_origins(), 0);
        handle.abort();
    }

    #[tokio::test]
    async fn build_state_rejects_invalid_policy() {
        let mut config = ServiceConfig::default();
        config.policy = LeaderboardPolicy::default().with_rate_limit(RateLimitPolicy::new(0, 60));
        assert!(LeaderboardServer::new(config).build_state().await.is_err());
    }

    #[test]
    fn cors_layer_rejects_bad_pattern() {
        let policy = CorsPolicy {
            allowed_origins: vec![],
            allowed_origin_pattern: Some("(".to_string()),
        };
        assert!(cors_layer(&policy).is_err());
    }

    #[tokio::test]
    async fn router_builds_over_memory_store() {
        let state = Arc::new(AppState::new(
            LeaderboardPolicy::default(),
            InMemoryScoreStore::shared(),
        ));
        assert!(build_router(state).is_ok());
    }
}
