//! Account authentication flows
//!
//! [`AuthService`] owns every operation that creates, authenticates or
//! mutates an account. HTTP handlers stay thin and delegate here.

use narrate_db::{Account, AccountUpdate, Database, NewAccount, normalize_phone};
use narrate_kv::KeyValueStore;
use narrate_notify::Notifier;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::jwt::JwtManager;
use crate::otp::{OtpPurpose, OtpService};
use crate::password::{DUMMY_HASH, hash_password, verify_password};
use crate::session::{DEFAULT_SESSION_TTL, SessionStore};
use crate::validation::{validate_full_name, validate_password, validate_phone_number};

/// Tunables for [`AuthService`]
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Lifetime of a session opened at login
    pub session_ttl: Duration,
    /// Return issued OTP codes to the caller (development only)
    pub expose_otp: bool,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: DEFAULT_SESSION_TTL,
            expose_otp: false,
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: i64,
    pub account: Account,
}

/// Result of issuing an OTP
///
/// `code` is only populated when OTP echo is enabled.
#[derive(Debug, Clone, Default)]
pub struct OtpDispatch {
    pub code: Option<String>,
}

/// Partial admin edit of an account
#[derive(Debug, Clone, Default)]
pub struct AccessUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub is_verified: Option<bool>,
    pub password: Option<String>,
}

impl AccessUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.is_admin.is_none()
            && self.is_blocked.is_none()
            && self.is_verified.is_none()
            && self.password.is_none()
    }
}

/// Counters for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub active_users: usize,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    jwt: Arc<JwtManager>,
    sessions: SessionStore,
    otp: OtpService,
    notifier: Arc<dyn Notifier>,
    settings: AuthSettings,
}

fn account_not_found() -> AuthError {
    AuthError::NotFound("Account not found".to_string())
}

fn record_login(outcome: &'static str) {
    metrics::counter!("narrate_logins_total", "outcome" => outcome).increment(1);
}

impl AuthService {
    pub fn new(
        db: Database,
        kv: Arc<dyn KeyValueStore>,
        jwt: Arc<JwtManager>,
        notifier: Arc<dyn Notifier>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            db,
            jwt,
            sessions: SessionStore::new(kv.clone()),
            otp: OtpService::new(kv),
            notifier,
            settings,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn jwt(&self) -> &Arc<JwtManager> {
        &self.jwt
    }

    // ==================== Registration & Login ====================

    /// Register a regular account and return its ID
    ///
    /// No session is opened; the caller must log in.
    pub async fn signup(
        &self,
        full_name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<i64, AuthError> {
        let account = self
            .create_account(full_name, phone_number, password, false)
            .await?;
        Ok(account.id)
    }

    /// Create an account with an explicit admin flag
    pub async fn create_account(
        &self,
        full_name: &str,
        phone_number: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<Account, AuthError> {
        let phone_number = normalize_phone(phone_number);
        validate_full_name(full_name)?;
        validate_phone_number(&phone_number)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let account = self
            .db
            .insert_account(NewAccount {
                full_name: full_name.trim().to_string(),
                phone_number,
                password_hash,
                is_admin,
            })
            .await?;

        info!("Created account {} (admin: {})", account.id, is_admin);
        Ok(account.scrubbed())
    }

    /// Authenticate and open a session
    ///
    /// Unknown phone numbers and wrong passwords fail identically. The blocked
    /// flag is only consulted once the password has verified.
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let phone_number = normalize_phone(phone_number);
        let account = self.db.get_account_by_phone(&phone_number).await?;

        // Always verify against some hash so response time does not reveal
        // whether the account exists
        let hash_to_verify = account
            .as_ref()
            .map(|a| a.password_hash.as_str())
            .unwrap_or(DUMMY_HASH);
        let password_valid = verify_password(password, hash_to_verify);

        let account = match account {
            Some(account) if password_valid => account,
            _ => {
                record_login("invalid_credentials");
                debug!("Login rejected: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if account.is_blocked {
            record_login("blocked");
            warn!("Login rejected for blocked account {}", account.id);
            return Err(AuthError::BlockedAccount);
        }

        let token = self.jwt.generate_token(account.id)?;
        self.sessions.open(account.id, self.settings.session_ttl).await?;

        record_login("success");
        info!("Account {} logged in", account.id);

        Ok(LoginOutcome {
            token,
            expires_in: self.jwt.expires_in_secs(),
            account: account.scrubbed(),
        })
    }

    /// Close the account's session; idempotent
    pub async fn logout(&self, account_id: i64) -> Result<(), AuthError> {
        self.sessions.close(account_id).await?;
        info!("Account {} logged out", account_id);
        Ok(())
    }

    // ==================== OTP Flows ====================

    /// Issue a password-reset code for a registered phone number
    pub async fn request_password_reset(&self, phone_number: &str) -> Result<OtpDispatch, AuthError> {
        let phone_number = normalize_phone(phone_number);
        if self.db.get_account_by_phone(&phone_number).await?.is_none() {
            return Err(account_not_found());
        }

        self.dispatch_otp(OtpPurpose::PasswordReset, &phone_number).await
    }

    /// Replace the password after checking a password-reset code
    ///
    /// Sessions that are already open stay open.
    pub async fn reset_password(
        &self,
        phone_number: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let phone_number = normalize_phone(phone_number);
        validate_password(new_password)?;

        self.otp
            .verify_and_consume(OtpPurpose::PasswordReset, &phone_number, code)
            .await?;

        let account = self
            .db
            .get_account_by_phone(&phone_number)
            .await?
            .ok_or_else(account_not_found)?;

        let password_hash = hash_password(new_password)?;
        self.db.update_account_password(account.id, &password_hash).await?;

        info!("Password reset for account {}", account.id);
        Ok(())
    }

    /// Issue a phone verification code
    pub async fn send_verification_otp(&self, phone_number: &str) -> Result<OtpDispatch, AuthError> {
        let phone_number = normalize_phone(phone_number);
        validate_phone_number(&phone_number)?;

        self.dispatch_otp(OtpPurpose::Verification, &phone_number).await
    }

    /// Check a verification code and mark the matching account verified
    ///
    /// Returns whether an account was marked.
    pub async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<bool, AuthError> {
        let phone_number = normalize_phone(phone_number);

        self.otp
            .verify_and_consume(OtpPurpose::Verification, &phone_number, code)
            .await?;

        let marked = self.db.mark_account_verified(&phone_number).await?;
        debug!("Phone verified (account marked: {})", marked);
        Ok(marked)
    }

    async fn dispatch_otp(
        &self,
        purpose: OtpPurpose,
        phone_number: &str,
    ) -> Result<OtpDispatch, AuthError> {
        let code = self.otp.issue(purpose, phone_number).await?;
        let minutes = purpose.ttl().as_secs() / 60;
        let message = match purpose {
            OtpPurpose::Verification => format!(
                "Your Narrate verification code is {}. It expires in {} minutes.",
                code, minutes
            ),
            OtpPurpose::PasswordReset => format!(
                "Your Narrate password reset code is {}. It expires in {} minutes.",
                code, minutes
            ),
        };

        self.notifier.send(phone_number, &message).await?;

        Ok(OtpDispatch {
            code: self.settings.expose_otp.then_some(code),
        })
    }

    // ==================== Account Self-Service ====================

    /// Fetch an account without its password hash
    pub async fn profile(&self, account_id: i64) -> Result<Account, AuthError> {
        self.db
            .get_account_by_id(account_id)
            .await?
            .map(Account::scrubbed)
            .ok_or_else(account_not_found)
    }

    /// Change a password after re-checking the current one
    pub async fn change_password(
        &self,
        account_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let account = self
            .db
            .get_account_by_id(account_id)
            .await?
            .ok_or_else(account_not_found)?;

        if !verify_password(old_password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(new_password)?;
        self.db.update_account_password(account_id, &password_hash).await?;

        info!("Password changed for account {}", account_id);
        Ok(())
    }

    // ==================== Administration ====================

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AuthError> {
        let accounts = self.db.list_accounts().await?;
        Ok(accounts.into_iter().map(Account::scrubbed).collect())
    }

    /// Accounts that currently hold a session
    ///
    /// Sessions whose account has since been deleted are skipped.
    pub async fn list_active_accounts(&self) -> Result<Vec<Account>, AuthError> {
        let ids: Vec<i64> = self.sessions.list_active_account_ids().await?.into_iter().collect();
        let accounts = self.db.get_accounts_by_ids(&ids).await?;
        Ok(accounts.into_iter().map(Account::scrubbed).collect())
    }

    pub async fn active_session_count(&self) -> Result<usize, AuthError> {
        Ok(self.sessions.list_active_account_ids().await?.len())
    }

    /// Block or unblock an account
    ///
    /// Open sessions are not closed.
    pub async fn set_blocked(&self, account_id: i64, is_blocked: bool) -> Result<(), AuthError> {
        if !self.db.set_account_blocked(account_id, is_blocked).await? {
            return Err(account_not_found());
        }
        info!("Account {} blocked: {}", account_id, is_blocked);
        Ok(())
    }

    /// Apply a partial admin edit and return the updated account
    pub async fn update_access(
        &self,
        account_id: i64,
        update: AccessUpdate,
    ) -> Result<Account, AuthError> {
        if update.is_empty() {
            return Err(AuthError::Validation("No fields to update".to_string()));
        }

        if let Some(ref full_name) = update.full_name {
            validate_full_name(full_name)?;
        }
        let phone_number = update.phone_number.as_deref().map(normalize_phone);
        if let Some(ref phone_number) = phone_number {
            validate_phone_number(phone_number)?;
        }
        let password_hash = match update.password {
            Some(ref password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let changes = AccountUpdate {
            full_name: update.full_name.map(|name| name.trim().to_string()),
            phone_number,
            password_hash,
            is_admin: update.is_admin,
            is_blocked: update.is_blocked,
            is_verified: update.is_verified,
        };

        if !self.db.update_account(account_id, changes).await? {
            return Err(account_not_found());
        }

        info!("Account {} updated by admin", account_id);
        self.profile(account_id).await
    }

    /// Delete an account and evict its session
    pub async fn remove_account(&self, account_id: i64) -> Result<(), AuthError> {
        if !self.db.delete_account(account_id).await? {
            return Err(account_not_found());
        }
        self.sessions.close(account_id).await?;

        info!("Account {} removed", account_id);
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AuthError> {
        Ok(DashboardStats {
            total_users: self.db.count_accounts().await?,
            active_users: self.active_session_count().await?,
        })
    }

    /// Deliver login credentials to a phone number
    pub async fn send_credentials(
        &self,
        full_name: &str,
        phone_number: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let phone_number = normalize_phone(phone_number);
        validate_full_name(full_name)?;
        validate_phone_number(&phone_number)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password cannot be empty".to_string()));
        }

        let message = format!(
            "Hello {}, your Narrate account is ready.\nPhone: {}\nPassword: {}",
            full_name.trim(),
            phone_number,
            password
        );
        self.notifier.send(&phone_number, &message).await?;

        debug!("Credentials delivered");
        Ok(())
    }
}
