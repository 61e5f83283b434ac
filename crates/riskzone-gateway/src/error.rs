//! Gateway error types

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use riskzone_kernel::config::ConfigError;
use riskzone_kernel::leaderboard::{LeaderboardError, StoreError};
use serde_json::json;
use thiserror::Error;

/// Reason sent with anti-abuse rejections.
pub const SCORE_OUT_OF_RANGE_DETAIL: &str = "Score exceeds expected range";
/// Reason sent with rate-limit rejections.
pub const RATE_LIMITED_DETAIL: &str = "Too many requests. Try again shortly.";

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Status, stable code and client-facing reason of this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            GatewayError::Leaderboard(err) => match err {
                LeaderboardError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    msg.clone(),
                ),
                LeaderboardError::ScoreOutOfRange { .. } => (
                    StatusCode::BAD_REQUEST,
                    "SCORE_OUT_OF_RANGE",
                    SCORE_OUT_OF_RANGE_DETAIL.to_string(),
                ),
                LeaderboardError::RateLimitExceeded { .. } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMIT_EXCEEDED",
                    RATE_LIMITED_DETAIL.to_string(),
                ),
                LeaderboardError::StoreUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Leaderboard storage is temporarily unavailable.".to_string(),
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    other.to_string(),
                ),
            },
            GatewayError::Config(_) | GatewayError::Store(_) | GatewayError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "internal error".to_string(),
            ),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "detail": message,
            "error": {
                "code": code,
                "message": message,
            }
        }));

        let mut response = (status, body).into_response();
        if let GatewayError::Leaderboard(LeaderboardError::RateLimitExceeded {
            retry_after_secs,
            ..
        }) = &self
        {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from((*retry_after_secs).max(1)),
            );
        }
        response
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
