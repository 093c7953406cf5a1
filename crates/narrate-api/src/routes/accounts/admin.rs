//! Admin account management routes

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};
use narrate_auth::{AccessUpdate, DashboardStats};
use narrate_db::Account;
use tracing::info;

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParam};
use crate::state::AppState;

use super::auth::RequireAdmin;
use super::types::{
    ActiveUsersResponse, BlockRequest, MessageResponse, SendCredentialRequest, UpdateAccessRequest,
};

/// GET /api/admin/users
async fn own_profile(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.auth.profile(admin.id).await?))
}

/// GET /api/admin/users/all
async fn list_accounts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.auth.list_accounts().await?))
}

/// GET /api/admin/active-users
async fn active_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ActiveUsersResponse>, ApiError> {
    let users = state.auth.list_active_accounts().await?;

    Ok(Json(ActiveUsersResponse {
        count: users.len(),
        users,
    }))
}

/// PUT /api/admin/users/{id}/block
async fn set_blocked(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<BlockRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.set_blocked(id, request.is_blocked).await?;

    info!("Admin {} set blocked={} on account {}", admin.id, request.is_blocked, id);
    let message = if request.is_blocked {
        "User blocked successfully"
    } else {
        "User unblocked successfully"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// PUT /api/admin/users/update/{id}
async fn update_access(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<UpdateAccessRequest>,
) -> Result<Json<Account>, ApiError> {
    let update = AccessUpdate {
        full_name: request.full_name,
        phone_number: request.phone_number,
        is_admin: request.is_admin,
        is_blocked: request.is_blocked,
        is_verified: request.is_verified,
        password: request.password,
    };

    Ok(Json(state.auth.update_access(id, update).await?))
}

/// DELETE /api/admin/users/{id}
async fn remove_account(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if admin.id == id {
        return Err(ApiError::BadRequest("Cannot delete your own account".to_string()));
    }

    state.auth.remove_account(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// POST /api/admin/sendcredential
async fn send_credential(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SendCredentialRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .send_credentials(&request.name, &request.phone_number, &request.password)
        .await?;

    Ok(Json(MessageResponse::new("Credentials sent successfully")))
}

/// GET /api/admin/dashboard/stats
async fn dashboard_stats(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.auth.dashboard_stats().await?))
}

/// Create admin routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(own_profile))
        .route("/api/admin/users/all", get(list_accounts))
        .route("/api/admin/active-users", get(active_users))
        .route("/api/admin/users/{id}/block", put(set_blocked))
        .route("/api/admin/users/update/{id}", put(update_access))
        .route("/api/admin/users/{id}", delete(remove_account))
        .route("/api/admin/sendcredential", post(send_credential))
        .route("/api/admin/dashboard/stats", get(dashboard_stats))
}
