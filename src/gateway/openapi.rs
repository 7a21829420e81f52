//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::handlers::admin::AdminStats;
use crate::user_auth::error::RetryInfo;
use crate::user_auth::models::{
    LoginRequest, PasswordResetRequest, RegisterRequest, Role, SessionResponse, UserProfile,
};

/// Session-token security schemes: httpOnly cookie for browsers, bearer
/// header for API clients.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "localhub_session",
                    "httpOnly session cookie set at login/register",
                ))),
            );
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Main API documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "The Local Hub Gateway API",
        version = "1.0.0",
        description = "Directory/marketplace gateway connecting users with local food producers.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::auth::register,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::auth::logout,
        crate::gateway::handlers::auth::me,
        crate::gateway::handlers::auth::password_reset,
        crate::gateway::handlers::admin::stats,
    ),
    components(schemas(
        HealthResponse,
        AdminStats,
        RegisterRequest,
        LoginRequest,
        PasswordResetRequest,
        SessionResponse,
        UserProfile,
        Role,
        RetryInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sessions and credentials"),
        (name = "Admin", description = "Admin-only operations"),
        (name = "System", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;
