//! Self-service account routes

use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use narrate_db::Account;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{ChangePasswordRequest, CountResponse, MessageResponse};

/// GET /api/user/active-count
async fn active_count(State(state): State<AppState>) -> Result<Json<CountResponse>, ApiError> {
    let count = state.auth.active_session_count().await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/user/profile
async fn profile(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.auth.profile(user.id).await?))
}

/// PUT /api/user/change-password
async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .change_password(user.id, &request.old_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user/active-count", get(active_count))
        .route("/api/user/profile", get(profile))
        .route("/api/user/change-password", put(change_password))
}
