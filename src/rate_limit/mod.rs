//! Sliding-window request rate limiting.
//!
//! - [`policy`] - The four named endpoint-class policies
//! - [`store`] - Shared per-fingerprint window store
//! - [`middleware`] - Axum admission middleware, fingerprinting, sweep task

pub mod middleware;
pub mod policy;
pub mod store;

pub use middleware::{RateLimiters, fingerprint, rate_limit_middleware};
pub use policy::{CountingMode, RateLimitPolicy};
pub use store::{Admission, RateLimitStore};
