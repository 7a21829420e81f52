//! The Local Hub Gateway entry point.
//!
//! Composition root: config, logging, database, trust primitives, rate-limit
//! stores. Startup is fatal without a signing secret, since a defaulted
//! secret would let anyone mint admin sessions offline.

use std::sync::Arc;
use std::time::Duration;

use localhub_gateway::config::{self, AppConfig};
use localhub_gateway::db::{self, UserRepository};
use localhub_gateway::gateway::{self, state::AppState};
use localhub_gateway::logging;
use localhub_gateway::rate_limit::RateLimiters;
use localhub_gateway::user_auth::{AuthService, TokenCodec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env)?;
    let _guard = logging::init_logging(&config);

    // Refuses to boot when the secret is absent or weak
    let secret = config::jwt_secret_from_env()?;

    let pool = db::connect(&config.database.url).await?;
    tracing::info!(url = %config.database.url, "database ready");

    let codec = Arc::new(TokenCodec::new(&secret));
    let repo = UserRepository::new(pool);
    let auth = Arc::new(AuthService::new(repo.clone(), codec.clone()));

    let limiters = RateLimiters::new(&config.rate_limits);
    let _sweeper = limiters.spawn_sweeper(Duration::from_secs(config.rate_limits.sweep_interval_secs));

    let state = Arc::new(AppState::new(
        auth,
        codec,
        repo,
        limiters,
        config.cookie_secure,
    ));

    gateway::serve(&config, state).await
}
