//! Risk Zone leaderboard — entry point.
//!
//! Loads the service configuration and starts the axum-based HTTP service.
//!
//! # Configuration
//!
//! | Source | Example |
//! |--------|---------|
//! | `--config <path>` or `RISKZONE_CONFIG` | `riskzone.toml`, `riskzone.yaml` |
//! | `RISKZONE_SERVER__PORT` | `8000` |
//! | `RISKZONE_SERVER__DATABASE_URL` | `sqlite://riskzone.db` (feature `sqlite`) |
//! | `RISKZONE_POLICY__SCORE_CEILING` | `50000` |
//! | `RISKZONE_POLICY__RATE_LIMIT__MAX_REQUESTS` | `120` |
//! | `RUST_LOG` | `riskzone_gateway=debug` |

use riskzone_gateway::server::LeaderboardServer;
use riskzone_kernel::config::ServiceConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn config_path() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    std::env::var("RISKZONE_CONFIG").ok()
}

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("riskzone_gateway=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let path = config_path();
    let config = match ServiceConfig::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, config = ?path, "failed to load configuration");
            std::process::exit(2);
        }
    };

    info!(
        bind = %config.bind_addr(),
        policy_version = %config.policy.version,
        score_ceiling = config.policy.score_ceiling,
        max_requests = config.policy.rate_limit.max_requests,
        window_secs = config.policy.rate_limit.window_secs,
        "Risk Zone leaderboard configuration loaded"
    );

    if let Err(e) = LeaderboardServer::new(config).start().await {
        error!(error = %e, "leaderboard server error");
        std::process::exit(1);
    }
}
