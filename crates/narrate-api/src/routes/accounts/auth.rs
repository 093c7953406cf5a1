//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    routing::post,
};
use narrate_auth::{AuthError, AuthUser};
use tracing::debug;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

use super::types::{
    LoginRequest, LoginResponse, MessageResponse, OtpResponse, PhoneRequest,
    ResetPasswordRequest, SignupRequest, SignupResponse, VerifyOtpRequest,
};

// ==================== Auth Extractors ====================

fn authorization_header(parts: &Parts) -> Result<Option<&str>, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .map(|h| h.to_str().map_err(|_| ApiError::Auth(AuthError::MissingCredentials)))
        .transpose()
}

/// Extractor for a caller with a live session
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let header = authorization_header(parts)?;

        let user = app_state.guard.authenticate(header).await?;
        debug!("Authenticated account: {}", user.id);
        Ok(RequireAuth(user))
    }
}

/// Extractor for an admin caller with a live session
pub struct RequireAdmin(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let header = authorization_header(parts)?;

        let user = app_state.guard.authorize_admin(header).await?;
        debug!("Authenticated admin: {}", user.id);
        Ok(RequireAdmin(user))
    }
}

// ==================== Auth Routes ====================

/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let id = state
        .auth
        .signup(&request.full_name, &request.phone_number, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully".to_string(),
            id,
        }),
    ))
}

/// POST /api/auth/login and /api/admin/login
async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let outcome = state
        .auth
        .login(&request.phone_number, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_in: outcome.expires_in,
        user: outcome.account,
    }))
}

/// POST /api/auth/logout
async fn logout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout(user.id).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// POST /api/auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PhoneRequest>,
) -> Result<Json<OtpResponse>, ApiError> {
    let dispatch = state.auth.request_password_reset(&request.phone_number).await?;

    Ok(Json(OtpResponse {
        message: "Password reset code sent".to_string(),
        otp: dispatch.code,
    }))
}

/// POST /api/auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .reset_password(&request.phone_number, &request.otp, &request.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password reset successfully")))
}

/// POST /api/auth/send-otp
async fn send_otp(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PhoneRequest>,
) -> Result<Json<OtpResponse>, ApiError> {
    let dispatch = state.auth.send_verification_otp(&request.phone_number).await?;

    Ok(Json(OtpResponse {
        message: "Verification code sent".to_string(),
        otp: dispatch.code,
    }))
}

/// POST /api/auth/verify-otp
async fn verify_otp(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.verify_otp(&request.phone_number, &request.otp).await?;
    Ok(Json(MessageResponse::new("Phone number verified")))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/send-otp", post(send_otp))
        .route("/api/auth/verify-otp", post(verify_otp))
        .route("/api/admin/login", post(login))
}
