//! Error taxonomy for the auth and rate-limit pipeline.
//!
//! Every variant is recovered at the middleware boundary and translated to
//! the unified `ApiResponse` envelope; nothing propagates as an uncaught
//! fault to the process level.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::gateway::types::{ApiResponse, error_codes};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,

    /// Signature failure, expiry, and malformed tokens are merged into one
    /// rejection so callers cannot probe which check failed.
    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Insufficient privileges")]
    Forbidden,

    #[error("{message}")]
    RateLimited { message: String, retry_after: u64 },

    /// A stored password digest failed to parse. Operational integrity
    /// fault, never caused by the request.
    #[error("Stored credential digest is malformed")]
    CorruptDigest,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingToken => error_codes::MISSING_AUTH,
            Self::InvalidToken | Self::InvalidCredentials => error_codes::AUTH_FAILED,
            Self::EmailTaken | Self::Validation(_) => error_codes::INVALID_PARAMETER,
            Self::Forbidden => error_codes::FORBIDDEN,
            Self::RateLimited { .. } => error_codes::RATE_LIMITED,
            Self::CorruptDigest | Self::Database(_) | Self::Internal(_) => {
                error_codes::INTERNAL_ERROR
            }
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::CorruptDigest | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Seconds-until-reset payload attached to rate-limit rejections.
#[derive(Debug, Serialize, ToSchema)]
pub struct RetryInfo {
    pub retry_after: u64,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let code = self.code();

        match self {
            Self::RateLimited {
                message,
                retry_after,
            } => {
                let body = ApiResponse {
                    code,
                    msg: message,
                    data: Some(RetryInfo { retry_after }),
                };
                (
                    status,
                    [(header::RETRY_AFTER, retry_after.to_string())],
                    Json(body),
                )
                    .into_response()
            }
            Self::CorruptDigest | Self::Database(_) | Self::Internal(_) => {
                // Log the detail, return a generic message
                tracing::error!("auth pipeline internal error: {:?}", self);
                let body = ApiResponse::<()>::error(code, "Internal server error");
                (status, Json(body)).into_response()
            }
            other => {
                let body = ApiResponse::<()>::error(code, other.to_string());
                (status, Json(body)).into_response()
            }
        }
    }
}
