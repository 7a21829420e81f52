//! User authentication: trust primitives and session middleware.
//!
//! - [`token`] - Session token codec (issue/verify)
//! - [`password`] - Credential hashing and verification
//! - [`middleware`] - Session resolver and role gate
//! - [`service`] - Registration and login flows
//! - [`error`] - Pipeline error taxonomy

pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

pub use error::AuthError;
pub use middleware::{
    SESSION_COOKIE, authenticate, authenticate_optional, check_role, extract_token, require_role,
};
pub use models::{Claims, Role};
pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use token::{SESSION_LIFETIME_DAYS, TokenCodec};
