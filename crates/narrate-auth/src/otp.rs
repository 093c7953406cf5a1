//! One-time codes for phone verification and password reset

use narrate_kv::KeyValueStore;
use rand::Rng;
use rand::rngs::OsRng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::AuthError;

/// What a one-time code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Verification => "verification",
            OtpPurpose::PasswordReset => "password-reset",
        }
    }

    /// How long an issued code stays valid
    pub fn ttl(&self) -> Duration {
        match self {
            OtpPurpose::Verification => Duration::from_secs(5 * 60),
            OtpPurpose::PasswordReset => Duration::from_secs(10 * 60),
        }
    }

    fn key(&self, phone_number: &str) -> String {
        format!("{}:{}", self.as_str(), phone_number)
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a uniformly distributed 6-digit code from the OS CSPRNG
pub fn generate_code() -> String {
    format!("{:06}", OsRng.gen_range(0..1_000_000u32))
}

/// Issues and checks one-time codes
///
/// At most one code is outstanding per (purpose, phone number); issuing a
/// new one replaces the old. `verify` leaves the code in place, so callers
/// must `consume` it after a successful check.
#[derive(Clone)]
pub struct OtpService {
    kv: Arc<dyn KeyValueStore>,
}

impl OtpService {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Issue a fresh code, replacing any outstanding one
    pub async fn issue(&self, purpose: OtpPurpose, phone_number: &str) -> Result<String, AuthError> {
        let code = generate_code();
        self.kv
            .set(&purpose.key(phone_number), &code, purpose.ttl())
            .await?;

        metrics::counter!("narrate_otp_issued_total", "purpose" => purpose.as_str()).increment(1);
        debug!("Issued {} code", purpose);
        Ok(code)
    }

    /// Check a candidate code without consuming it
    pub async fn verify(
        &self,
        purpose: OtpPurpose,
        phone_number: &str,
        candidate: &str,
    ) -> Result<(), AuthError> {
        let stored = self
            .kv
            .get(&purpose.key(phone_number))
            .await?
            .ok_or_else(|| AuthError::NotFound("OTP expired or not found".to_string()))?;

        if stored != candidate.trim() {
            return Err(AuthError::Mismatch);
        }
        Ok(())
    }

    /// Delete the outstanding code
    ///
    /// Only the caller whose delete actually removed the code succeeds; a
    /// concurrent or repeated consume gets `NotFound`.
    pub async fn consume(&self, purpose: OtpPurpose, phone_number: &str) -> Result<(), AuthError> {
        if !self.kv.delete(&purpose.key(phone_number)).await? {
            return Err(AuthError::NotFound("OTP expired or not found".to_string()));
        }
        Ok(())
    }

    /// Verify and, on success, consume in one call
    pub async fn verify_and_consume(
        &self,
        purpose: OtpPurpose,
        phone_number: &str,
        candidate: &str,
    ) -> Result<(), AuthError> {
        self.verify(purpose, phone_number, candidate).await?;
        self.consume(purpose, phone_number).await
    }
}
