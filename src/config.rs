use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::rate_limit::RateLimitPolicy;

/// Environment variable holding the session-token signing secret.
///
/// There is deliberately no default: a guessable secret lets anyone mint
/// admin sessions offline, so startup refuses to proceed without one.
pub const JWT_SECRET_ENV: &str = "LOCALHUB_JWT_SECRET";

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub rate_limits: RateLimitSettings,
    /// Set the `Secure` attribute on the session cookie (HTTPS deployments).
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://localhub.db".to_string(),
        }
    }
}

/// Per-endpoint-class rate-limit tunables plus the sweep interval.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
    #[serde(default = "RateLimitPolicy::auth")]
    pub auth: RateLimitPolicy,
    #[serde(default = "RateLimitPolicy::password_reset")]
    pub password_reset: RateLimitPolicy,
    #[serde(default = "RateLimitPolicy::admin")]
    pub admin: RateLimitPolicy,
    #[serde(default = "RateLimitPolicy::api")]
    pub api: RateLimitPolicy,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            auth: RateLimitPolicy::auth(),
            password_reset: RateLimitPolicy::password_reset(),
            admin: RateLimitPolicy::admin(),
            api: RateLimitPolicy::api(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))
    }
}

/// Read the signing secret from the environment, refusing weak values.
pub fn jwt_secret_from_env() -> anyhow::Result<String> {
    let secret = std::env::var(JWT_SECRET_ENV)
        .with_context(|| format!("{} must be set; refusing to start without it", JWT_SECRET_ENV))?;
    if secret.len() < MIN_SECRET_LEN {
        anyhow::bail!(
            "{} must be at least {} bytes, got {}",
            JWT_SECRET_ENV,
            MIN_SECRET_LEN,
            secret.len()
        );
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults() {
        let settings = RateLimitSettings::default();
        assert_eq!(settings.auth.max_attempts, 5);
        assert_eq!(settings.auth.window_secs, 15 * 60);
        assert_eq!(settings.password_reset.max_attempts, 3);
        assert_eq!(settings.password_reset.window_secs, 60 * 60);
        assert_eq!(settings.admin.max_attempts, 100);
        assert_eq!(settings.api.window_secs, 60);
        assert_eq!(settings.sweep_interval_secs, 60);
    }

    #[test]
    fn test_partial_yaml_uses_policy_defaults() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: gateway.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
rate_limits:
  auth:
    window_secs: 60
    max_attempts: 2
    message: "slow down"
    mode: refund_on_success
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.rate_limits.auth.max_attempts, 2);
        // Unspecified policies fall back to their named defaults
        assert_eq!(config.rate_limits.password_reset.max_attempts, 3);
        assert_eq!(config.database.url, "sqlite://localhub.db");
        assert!(!config.cookie_secure);
    }
}
