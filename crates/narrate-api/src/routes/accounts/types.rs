//! Request/Response DTOs for the account API

use narrate_db::Account;
use serde::{Deserialize, Serialize};

// ==================== Shared ====================

/// Plain acknowledgement
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A bare count
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

// ==================== Auth Types ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: Account,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    pub phone_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub phone_number: String,
    pub otp: String,
    pub new_password: String,
}

/// Response to an OTP request; `otp` is present only when echo is enabled
#[derive(Debug, Serialize, Deserialize)]
pub struct OtpResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub otp: Option<String>,
}

// ==================== User Types ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ==================== Admin Types ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub is_blocked: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccessRequest {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub is_verified: Option<bool>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCredentialRequest {
    pub name: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActiveUsersResponse {
    pub count: usize,
    pub users: Vec<Account>,
}
