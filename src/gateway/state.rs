//! Shared gateway application state (composition root).

use std::sync::Arc;

use crate::db::UserRepository;
use crate::rate_limit::RateLimiters;
use crate::user_auth::{AuthService, TokenCodec};

/// Gateway application state, shared across requests.
///
/// Every collaborator is constructed once in `main` (or a test harness) and
/// injected here; middleware and handlers hold no hidden globals.
#[derive(Clone)]
pub struct AppState {
    /// Registration/login flows
    pub auth: Arc<AuthService>,
    /// Session token codec (one secret per process)
    pub codec: Arc<TokenCodec>,
    /// User queries for profile/stats endpoints
    pub repo: UserRepository,
    /// Per-endpoint-class rate-limit stores
    pub limiters: RateLimiters,
    /// Set `Secure` on session cookies
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        codec: Arc<TokenCodec>,
        repo: UserRepository,
        limiters: RateLimiters,
        cookie_secure: bool,
    ) -> Self {
        Self {
            auth,
            codec,
            repo,
            limiters,
            cookie_secure,
        }
    }
}
