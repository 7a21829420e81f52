//! Named rate-limit policies.
//!
//! Four endpoint classes share one mechanism and differ only in parameters.
//! All fields are config-tunable; the constructors are the shipped defaults.

use serde::{Deserialize, Serialize};

/// How admitted attempts are counted against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Every admitted request counts, regardless of outcome.
    Always,
    /// Count on admission, refund when the response is 2xx. Legitimate
    /// repeated logins never accumulate; failures do.
    RefundOnSuccess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    pub window_secs: u64,
    pub max_attempts: u32,
    /// Message returned with a 429.
    pub message: String,
    pub mode: CountingMode,
}

impl RateLimitPolicy {
    /// Login/register: 15-minute window, 5 attempts, refunded on success.
    pub fn auth() -> Self {
        Self {
            window_secs: 15 * 60,
            max_attempts: 5,
            message: "Too many authentication attempts, please try again later".to_string(),
            mode: CountingMode::RefundOnSuccess,
        }
    }

    /// Password reset: 60-minute window, 3 attempts, always counted.
    pub fn password_reset() -> Self {
        Self {
            window_secs: 60 * 60,
            max_attempts: 3,
            message: "Too many password reset requests, please try again later".to_string(),
            mode: CountingMode::Always,
        }
    }

    /// Admin actions: 1-minute window, 100 attempts, always counted.
    pub fn admin() -> Self {
        Self {
            window_secs: 60,
            max_attempts: 100,
            message: "Too many admin requests, please slow down".to_string(),
            mode: CountingMode::Always,
        }
    }

    /// General API: 1-minute window, 100 attempts, always counted.
    pub fn api() -> Self {
        Self {
            window_secs: 60,
            max_attempts: 100,
            message: "Too many requests, please slow down".to_string(),
            mode: CountingMode::Always,
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_secs as i64 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_policies() {
        let auth = RateLimitPolicy::auth();
        assert_eq!(auth.window_secs, 900);
        assert_eq!(auth.max_attempts, 5);
        assert_eq!(auth.mode, CountingMode::RefundOnSuccess);

        let reset = RateLimitPolicy::password_reset();
        assert_eq!(reset.window_secs, 3600);
        assert_eq!(reset.max_attempts, 3);
        assert_eq!(reset.mode, CountingMode::Always);

        assert_eq!(RateLimitPolicy::admin().max_attempts, 100);
        assert_eq!(RateLimitPolicy::api().window_ms(), 60_000);
    }

    #[test]
    fn test_mode_serde() {
        let mode: CountingMode = serde_yaml::from_str("refund_on_success").unwrap();
        assert_eq!(mode, CountingMode::RefundOnSuccess);
        let mode: CountingMode = serde_yaml::from_str("always").unwrap();
        assert_eq!(mode, CountingMode::Always);
    }
}
