//! Rate-limit middleware and client fingerprinting.
//!
//! Admission happens before the handler; outcome reporting is consumed
//! here, after the handler, by inspecting the response status. Handlers
//! cannot forget to report.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::policy::CountingMode;
use super::store::{Admission, RateLimitStore};
use crate::config::RateLimitSettings;
use crate::user_auth::AuthError;

/// Truncation length for the user-agent part of the fingerprint.
const UA_FINGERPRINT_LEN: usize = 50;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Derive the client fingerprint: forwarded-for first entry (falling back
/// to the peer address), plus the first 50 characters of the user-agent.
///
/// Deliberately imprecise: enough to spot a brute-force script from one
/// IP+UA combination without needing accounts or cookies. Missing headers
/// degrade the key, they never fault the request.
pub fn fingerprint(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let addr = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|first| first.trim().to_string())
        .filter(|first| !first.is_empty())
        .or_else(|| peer.map(|p| p.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    let agent: String = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .chars()
        .take(UA_FINGERPRINT_LEN)
        .collect();

    format!("{}:{}", addr, agent)
}

/// Admission middleware for one policy store.
///
/// On rejection the chain terminates with a 429 carrying `retry_after`.
/// On admission the handler runs, and for refund-on-success policies a 2xx
/// response gives the attempt back.
pub async fn rate_limit_middleware(
    State(store): State<Arc<RateLimitStore>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = fingerprint(request.headers(), peer);

    match store.try_admit(&key, now_ms()) {
        Admission::Limited { retry_after_secs } => {
            tracing::warn!(fingerprint = %key, retry_after = retry_after_secs, "rate limited");
            AuthError::RateLimited {
                message: store.policy().message.clone(),
                retry_after: retry_after_secs,
            }
            .into_response()
        }
        Admission::Admitted => {
            let response = next.run(request).await;
            if store.policy().mode == CountingMode::RefundOnSuccess
                && response.status().is_success()
            {
                store.refund(&key, now_ms());
            }
            response
        }
    }
}

/// The four policy stores, one per endpoint class.
///
/// Owned by the composition root and injected into middleware; never a
/// process-wide singleton.
#[derive(Clone)]
pub struct RateLimiters {
    pub auth: Arc<RateLimitStore>,
    pub password_reset: Arc<RateLimitStore>,
    pub admin: Arc<RateLimitStore>,
    pub api: Arc<RateLimitStore>,
}

impl RateLimiters {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            auth: Arc::new(RateLimitStore::new(settings.auth.clone())),
            password_reset: Arc::new(RateLimitStore::new(settings.password_reset.clone())),
            admin: Arc::new(RateLimitStore::new(settings.admin.clone())),
            api: Arc::new(RateLimitStore::new(settings.api.clone())),
        }
    }

    /// Spawn the periodic eviction task over all four stores.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let stores = [
            Arc::clone(&self.auth),
            Arc::clone(&self.password_reset),
            Arc::clone(&self.admin),
            Arc::clone(&self.api),
        ];
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let now = now_ms();
                let evicted: usize = stores.iter().map(|store| store.sweep(now)).sum();
                if evicted > 0 {
                    tracing::debug!(evicted, "rate-limit sweep evicted expired windows");
                }
            }
        })
    }
}
