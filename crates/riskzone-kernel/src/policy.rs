//! Versioned leaderboard policy.
//!
//! Every tunable constant of the service (rate-limit window and size,
//! anti-abuse ceiling, CORS allowlist) lives in one [`LeaderboardPolicy`]
//! injected at startup. Call [`validate()`](LeaderboardPolicy::validate)
//! before building any runtime component from it.

use crate::leaderboard::SCORE_MAX;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Policy configuration error.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum PolicyError {
    #[error("policy version cannot be empty")]
    EmptyVersion,

    #[error("rate-limit window must be greater than zero")]
    ZeroWindow,

    #[error("rate-limit max_requests must be greater than zero")]
    ZeroLimit,

    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("score ceiling {0} exceeds the hard score bound of 999999")]
    CeilingAboveHardBound(u32),

    #[error("invalid allowed-origin pattern '{0}': {1}")]
    InvalidOriginPattern(String, String),
}

// ─────────────────────────────────────────────────────────────────────────────
// RateLimitPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed-window admission parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitPolicy {
    /// Length of one counting window, in seconds.
    pub window_secs: u64,
    /// Writes admitted per origin per window.
    pub max_requests: u64,
    /// How often expired buckets are swept, in seconds.
    pub sweep_interval_secs: u64,
    /// Key origins by `X-Forwarded-For` / `X-Real-IP` before the peer address.
    /// Only enable behind a proxy that overwrites these headers.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 120,
            sweep_interval_secs: 60,
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitPolicy {
    pub fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            window_secs,
            max_requests,
            ..Default::default()
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    fn validate(&self) -> Result<(), PolicyError> {
        if self.window_secs == 0 {
            return Err(PolicyError::ZeroWindow);
        }
        if self.max_requests == 0 {
            return Err(PolicyError::ZeroLimit);
        }
        if self.sweep_interval_secs == 0 {
            return Err(PolicyError::ZeroSweepInterval);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CorsPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsPolicy {
    /// Exact origins, e.g. `https://risk-zone.vercel.app`.
    pub allowed_origins: Vec<String>,
    /// Optional regular expression matched against the full origin.
    pub allowed_origin_pattern: Option<String>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "https://localhost:5173".to_string(),
                "https://risk-zone.vercel.app".to_string(),
            ],
            allowed_origin_pattern: Some(r"^https://[a-zA-Z0-9-]+\.vercel\.app$".to_string()),
        }
    }
}

impl CorsPolicy {
    /// Compile this policy into a reusable matcher.
    pub fn matcher(&self) -> Result<OriginMatcher, PolicyError> {
        let pattern = self
            .allowed_origin_pattern
            .as_deref()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| PolicyError::InvalidOriginPattern(p.to_string(), e.to_string()))
            })
            .transpose()?;
        Ok(OriginMatcher {
            exact: self.allowed_origins.clone(),
            pattern,
        })
    }
}

/// Compiled [`CorsPolicy`].
#[derive(Debug, Clone)]
pub struct OriginMatcher {
    exact: Vec<String>,
    pattern: Option<Regex>,
}

impl OriginMatcher {
    pub fn allows(&self, origin: &str) -> bool {
        self.exact.iter().any(|o| o == origin)
            || self.pattern.as_ref().is_some_and(|re| re.is_match(origin))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LeaderboardPolicy
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level policy set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardPolicy {
    /// Identifier reported by `GET /version`.
    pub version: String,
    /// Anti-abuse ceiling; scores above it are rejected as implausible.
    pub score_ceiling: u32,
    pub rate_limit: RateLimitPolicy,
    pub cors: CorsPolicy,
}

impl Default for LeaderboardPolicy {
    fn default() -> Self {
        Self {
            version: "cors-1".to_string(),
            score_ceiling: 50_000,
            rate_limit: RateLimitPolicy::default(),
            cors: CorsPolicy::default(),
        }
    }
}

impl LeaderboardPolicy {
    /// Builder: set the policy version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builder: set the anti-abuse ceiling.
    pub fn with_score_ceiling(mut self, ceiling: u32) -> Self {
        self.score_ceiling = ceiling;
        self
    }

    /// Builder: set the rate-limit parameters.
    pub fn with_rate_limit(mut self, rate_limit: RateLimitPolicy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Builder: set the CORS allowlist.
    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    /// Validate all structural invariants of this policy.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.version.trim().is_empty() {
            return Err(PolicyError::EmptyVersion);
        }
        if self.score_ceiling > SCORE_MAX {
            return Err(PolicyError::CeilingAboveHardBound(self.score_ceiling));
        }
        self.rate_limit.validate()?;
        self.cors.matcher()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = LeaderboardPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.rate_limit.window(), Duration::from_secs(60));
        assert_eq!(policy.rate_limit.max_requests, 120);
        assert_eq!(policy.score_ceiling, 50_000);
    }

    #[test]
    fn rejects_empty_version() {
        let policy = LeaderboardPolicy::default().with_version("  ");
        assert_eq!(policy.validate(), Err(PolicyError::EmptyVersion));
    }

    #[test]
    fn rejects_ceiling_above_hard_bound() {
        let policy = LeaderboardPolicy::default().with_score_ceiling(SCORE_MAX + 1);
        assert_eq!(
            policy.validate(),
            Err(PolicyError::CeilingAboveHardBound(SCORE_MAX + 1))
        );
        assert!(LeaderboardPolicy::default()
            .with_score_ceiling(SCORE_MAX)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_zero_rate_limit_parameters() {
        let zero_window = LeaderboardPolicy::default().with_rate_limit(RateLimitPolicy::new(10, 0));
        assert_eq!(zero_window.validate(), Err(PolicyError::ZeroWindow));

        let zero_limit = LeaderboardPolicy::default().with_rate_limit(RateLimitPolicy::new(0, 60));
        assert_eq!(zero_limit.validate(), Err(PolicyError::ZeroLimit));

        let mut rl = RateLimitPolicy::default();
        rl.sweep_interval_secs = 0;
        let zero_sweep = LeaderboardPolicy::default().with_rate_limit(rl);
        assert_eq!(zero_sweep.validate(), Err(PolicyError::ZeroSweepInterval));
    }

    #[test]
    fn rejects_broken_origin_pattern() {
        let policy = LeaderboardPolicy::default().with_cors(CorsPolicy {
            allowed_origins: vec![],
            allowed_origin_pattern: Some("^(unclosed".to_string()),
        });
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::InvalidOriginPattern(..))
        ));
    }

    #[test]
    fn default_cors_matches_allowlist_and_preview_deploys() {
        let matcher = CorsPolicy::default().matcher().unwrap();
        assert!(matcher.allows("http://localhost:5173"));
        assert!(matcher.allows("https://risk-zone.vercel.app"));
        assert!(matcher.allows("https://risk-zone-git-main-team.vercel.app"));
        assert!(!matcher.allows("http://risk-zone.vercel.app"));
        assert!(!matcher.allows("https://evil.example.com"));
        assert!(!matcher.allows("https://a.b.vercel.app"));
    }

    #[test]
    fn partial_input_keeps_defaults() {
        let policy: LeaderboardPolicy =
            serde_json::from_str(r#"{"score_ceiling": 70000, "rate_limit": {"max_requests": 5}}"#)
                .unwrap();
        assert_eq!(policy.score_ceiling, 70_000);
        assert_eq!(policy.rate_limit.max_requests, 5);
        assert_eq!(policy.rate_limit.window_secs, 60);
        assert_eq!(policy.version, "cors-1");
    }
}
