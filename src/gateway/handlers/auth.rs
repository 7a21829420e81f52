//! Auth route handlers: register, login, logout, me, password reset.

use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use validator::Validate;

use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;
use crate::user_auth::models::{
    LoginRequest, PasswordResetRequest, RegisterRequest, SessionResponse, UserProfile,
};
use crate::user_auth::{AuthError, Claims, SESSION_COOKIE};

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}

fn validated<T: Validate>(req: T) -> Result<T, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    Ok(req)
}

/// Register a new user
///
/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<SessionResponse>),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
        (status = 429, description = "Rate limited")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SessionResponse>>), AuthError> {
    let req = validated(req)?;
    let session = state.auth.register(req).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.cookie_secure));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiResponse::success(session)),
    ))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<SessionResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Rate limited")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<SessionResponse>>), AuthError> {
    let req = validated(req)?;
    let session = state.auth.login(req).await?;
    let jar = jar.add(session_cookie(session.token.clone(), state.cookie_secure));
    Ok((StatusCode::OK, jar, Json(ApiResponse::success(session))))
}

/// Logout (clears the session cookie; tokens are not revocable server-side)
///
/// POST /api/v1/auth/logout
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared")
    ),
    tag = "Auth"
)]
pub async fn logout(jar: CookieJar) -> (StatusCode, CookieJar, Json<ApiResponse<()>>) {
    let jar = jar.remove(removal_cookie());
    (StatusCode::OK, jar, Json(ApiResponse::success(())))
}

/// Current session identity
///
/// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Caller profile", body = ApiResponse<UserProfile>),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Invalid or expired session")
    ),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserProfile>>, AuthError> {
    let profile = state.auth.me(&claims).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// Request a password reset
///
/// POST /api/v1/auth/password-reset
///
/// Always answers 202 so the endpoint cannot be used to probe which emails
/// have accounts.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Reset accepted"),
        (status = 429, description = "Rate limited")
    ),
    tag = "Auth"
)]
pub async fn password_reset(
    Json(req): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), AuthError> {
    let req = validated(req)?;
    tracing::info!(email = %req.email, "password reset requested");
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(()))))
}
