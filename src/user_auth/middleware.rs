//! Session resolver and role gate middleware.
//!
//! Token extraction precedence: the session cookie first (httpOnly, favored
//! for browser clients), then `Authorization: Bearer` for API clients. The
//! strict resolver rejects; the optional resolver continues without an
//! identity. The role gate assumes the strict resolver already ran.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::error::AuthError;
use super::models::{Claims, Role};
use crate::gateway::state::AppState;

/// Name of the session cookie set at login/register.
pub const SESSION_COOKIE: &str = "localhub_session";

/// Pull a session token out of the request headers, cookie first.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Strict session resolver: no token is 401, a bad token is 403.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(request.headers()).ok_or(AuthError::MissingToken)?;
    let claims = state.codec.verify(&token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Optional session resolver: attaches claims when a valid token is
/// present, continues silently otherwise.
pub async fn authenticate_optional(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(request.headers()) {
        if let Ok(claims) = state.codec.verify(&token) {
            request.extensions_mut().insert(claims);
        }
    }
    next.run(request).await
}

/// Pure role predicate behind the gate, split out for tests.
pub fn check_role(claims: Option<&Claims>, required: Role) -> Result<(), AuthError> {
    match claims {
        Some(claims) if claims.role == required => Ok(()),
        _ => Err(AuthError::Forbidden),
    }
}

/// Role gate. Must be layered after the strict resolver; a request that
/// never passed it simply carries no claims and is rejected, not crashed.
pub async fn require_role(
    required: Role,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    check_role(request.extensions().get::<Claims>(), required)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: 1,
            email: "a@b.com".to_string(),
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("localhub_session=cookie-token"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        assert_eq!(extract_token(&headers), Some("cookie-token".to_string()));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        assert_eq!(extract_token(&headers), Some("header-token".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        // Wrong scheme is not a token
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_role_gate_rejects_non_admin() {
        let user = claims(Role::User);
        assert!(matches!(
            check_role(Some(&user), Role::Admin),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_role_gate_rejects_missing_claims() {
        assert!(matches!(
            check_role(None, Role::Admin),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn test_role_gate_admits_admin() {
        let admin = claims(Role::Admin);
        assert!(check_role(Some(&admin), Role::Admin).is_ok());
    }
}
