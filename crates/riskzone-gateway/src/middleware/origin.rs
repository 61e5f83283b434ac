//! Client origin resolution

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::AppState;

/// Identity used when the transport supplies no client address.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// The identity a request is rate-limited by.
///
/// Resolved from the peer socket address. With
/// `policy.rate_limit.trust_forwarded_for` enabled, the first
/// `X-Forwarded-For` hop (then `X-Real-IP`) takes precedence. Never fails:
/// requests without any address share [`UNKNOWN_ORIGIN`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin(pub String);

impl ClientOrigin {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromRequestParts<Arc<AppState>> for ClientOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.policy.rate_limit.trust_forwarded_for {
            if let Some(forwarded) = forwarded_origin(&parts.headers) {
                return Ok(Self(forwarded));
            }
        }

        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Self(peer.unwrap_or_else(|| UNKNOWN_ORIGIN.to_string())))
    }
}

fn forwarded_origin(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next());

    first_hop
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
