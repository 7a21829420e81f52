//! Gateway HTTP surface: router assembly and serving.
//!
//! Middleware ordering per route class is fixed: rate limiter first, then
//! the session resolver, then the role gate, then the handler.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::rate_limit::rate_limit_middleware;
use crate::user_auth::{Role, authenticate, authenticate_optional, require_role};
use openapi::ApiDoc;
use state::AppState;

/// Build the full gateway router against an injected state.
///
/// Tests call this directly with a fresh state (fresh rate-limit stores,
/// in-memory database) and drive it with `tower::ServiceExt`.
pub fn router(state: Arc<AppState>) -> Router {
    // Credential endpoints: auth policy (refund on success)
    let credential_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(
            state.limiters.auth.clone(),
            rate_limit_middleware,
        ));

    let reset_routes = Router::new()
        .route("/auth/password-reset", post(handlers::auth::password_reset))
        .route_layer(from_fn_with_state(
            state.limiters.password_reset.clone(),
            rate_limit_middleware,
        ));

    // Strict resolver: no token 401, bad token 403
    let session_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .route_layer(from_fn_with_state(
            state.limiters.api.clone(),
            rate_limit_middleware,
        ));

    // Logout works with or without a valid session
    let logout_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route_layer(from_fn_with_state(state.clone(), authenticate_optional))
        .route_layer(from_fn_with_state(
            state.limiters.api.clone(),
            rate_limit_middleware,
        ));

    // Role gate layers after the strict resolver
    let admin_routes = Router::new()
        .route("/admin/stats", get(handlers::admin::stats))
        .route_layer(from_fn(|request, next| {
            require_role(Role::Admin, request, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), authenticate))
        .route_layer(from_fn_with_state(
            state.limiters.admin.clone(),
            rate_limit_middleware,
        ));

    let api_v1 = credential_routes
        .merge(reset_routes)
        .merge(session_routes)
        .merge(logout_routes)
        .merge(admin_routes);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(config: &AppConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on {}", addr);

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app).await?;
    Ok(())
}
