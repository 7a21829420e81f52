//! Admin route handlers. Reached only through the strict resolver plus the
//! admin role gate.

use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::gateway::state::AppState;
use crate::gateway::types::ApiResponse;
use crate::user_auth::{AuthError, Role};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_users: i64,
    pub admin_users: i64,
}

/// Platform statistics
///
/// GET /api/v1/admin/stats
#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    responses(
        (status = 200, description = "User counts", body = ApiResponse<AdminStats>),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Admin role required"),
        (status = 429, description = "Rate limited")
    ),
    tag = "Admin"
)]
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AdminStats>>, AuthError> {
    let total_users = state.repo.count_users().await?;
    let admin_users = state.repo.count_by_role(Role::Admin.as_str()).await?;
    Ok(Json(ApiResponse::success(AdminStats {
        total_users,
        admin_users,
    })))
}
