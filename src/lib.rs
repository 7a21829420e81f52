//! The Local Hub Gateway
//!
//! HTTP gateway for The Local Hub marketplace. The core of this crate is
//! the request pipeline: rate limiter, session resolver, role gate, then
//! the business handler.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration and the environment-held signing secret
//! - [`logging`] - tracing initialization (rolling file + stdout)
//! - [`db`] - SQLite user store
//! - [`user_auth`] - Token codec, credential verifier, session middleware
//! - [`rate_limit`] - Sliding-window rate limiting per endpoint class
//! - [`gateway`] - Router assembly and route handlers

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod rate_limit;
pub mod user_auth;

// Convenient re-exports at crate root
pub use config::{AppConfig, RateLimitSettings};
pub use db::{UserRecord, UserRepository};
pub use gateway::state::AppState;
pub use rate_limit::{Admission, RateLimitPolicy, RateLimitStore, RateLimiters};
pub use user_auth::{AuthError, AuthService, Claims, Role, TokenCodec};
