//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// Account model
///
/// The password hash is never serialized, so an `Account` can be handed to
/// API responses as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub full_name: String,
    pub phone_number: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_blocked: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Return a copy with the password hash cleared
    pub fn scrubbed(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// New account (for insertion)
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub phone_number: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Partial account update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
    pub is_blocked: Option<bool>,
    pub is_verified: Option<bool>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.password_hash.is_none()
            && self.is_admin.is_none()
            && self.is_blocked.is_none()
            && self.is_verified.is_none()
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for Account {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            phone_number: row.try_get("phone_number")?,
            password_hash: row.try_get("password_hash")?,
            is_admin: row.try_get("is_admin")?,
            is_blocked: row.try_get("is_blocked")?,
            is_verified: row.try_get("is_verified")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
            updated_at: parse_datetime_or_now(&row.try_get::<String, _>("updated_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_serialization_hides_password() {
        let account = Account {
            id: 7,
            full_name: "Alice".to_string(),
            phone_number: "+15550001".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_admin: false,
            is_blocked: false,
            is_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains("\"fullName\":\"Alice\""));
        assert!(json.contains("\"isVerified\":true"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("passwordHash"));

        assert!(account.scrubbed().password_hash.is_empty());
    }

    #[test]
    fn test_account_update_is_empty() {
        assert!(AccountUpdate::default().is_empty());

        let update = AccountUpdate {
            is_blocked: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
