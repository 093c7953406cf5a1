//! Account operations

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::error::DbError;
use crate::models::{Account, AccountUpdate, NewAccount};
use crate::repository::Database;

const ACCOUNT_COLUMNS: &str = "id, full_name, phone_number, password_hash, is_admin, is_blocked, is_verified, created_at, updated_at";

/// Map a UNIQUE constraint violation on the phone number to `DbError::Duplicate`
fn map_unique_violation(err: sqlx::Error, phone_number: &str) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            DbError::Duplicate(format!("Phone number '{}' already registered", phone_number))
        }
        _ => DbError::Connection(err),
    }
}

impl Database {
    // ==================== Account Operations ====================

    /// Insert a new account
    pub async fn insert_account(&self, account: NewAccount) -> Result<Account, DbError> {
        let now = Utc::now();

        // Check if the phone number is already taken
        let existing = self.get_account_by_phone(&account.phone_number).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Phone number '{}' already registered",
                account.phone_number
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (full_name, phone_number, password_hash, is_admin, is_blocked, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, 0, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.full_name)
        .bind(&account.phone_number)
        .bind(&account.password_hash)
        .bind(account.is_admin)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &account.phone_number))?;

        let id: i64 = result.get("id");

        Ok(Account {
            id,
            full_name: account.full_name,
            phone_number: account.phone_number,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
            is_blocked: false,
            is_verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an account by phone number
    pub async fn get_account_by_phone(&self, phone_number: &str) -> Result<Option<Account>, DbError> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE phone_number = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Account::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get an account by ID
    pub async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>, DbError> {
        let result = sqlx::query(&format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Account::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get all accounts whose ID is in `ids`; unknown IDs are skipped
    pub async fn get_accounts_by_ids(&self, ids: &[i64]) -> Result<Vec<Account>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM accounts WHERE id IN (", ACCOUNT_COLUMNS));
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Account::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> Result<Vec<Account>, DbError> {
        let rows = sqlx::query(&format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Account::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Apply a partial update
    ///
    /// Returns `false` when no account has the given ID. An empty update
    /// only touches `updated_at`.
    pub async fn update_account(&self, id: i64, update: AccountUpdate) -> Result<bool, DbError> {
        let now = Utc::now();
        let phone_number = update.phone_number.clone().unwrap_or_default();

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE accounts SET updated_at = ");
        builder.push_bind(now.to_rfc3339());

        if let Some(full_name) = update.full_name {
            builder.push(", full_name = ").push_bind(full_name);
        }
        if let Some(phone) = update.phone_number {
            builder.push(", phone_number = ").push_bind(phone);
        }
        if let Some(password_hash) = update.password_hash {
            builder.push(", password_hash = ").push_bind(password_hash);
        }
        if let Some(is_admin) = update.is_admin {
            builder.push(", is_admin = ").push_bind(is_admin);
        }
        if let Some(is_blocked) = update.is_blocked {
            builder.push(", is_blocked = ").push_bind(is_blocked);
        }
        if let Some(is_verified) = update.is_verified {
            builder.push(", is_verified = ").push_bind(is_verified);
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &phone_number))?;
        Ok(result.rows_affected() > 0)
    }

    /// Update account password
    pub async fn update_account_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Block or unblock an account
    pub async fn set_account_blocked(&self, id: i64, is_blocked: bool) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_blocked = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(is_blocked)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark the account owning `phone_number` as verified
    pub async fn mark_account_verified(&self, phone_number: &str) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_verified = 1, updated_at = ?
            WHERE phone_number = ?
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(phone_number)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an account
    pub async fn delete_account(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all accounts
    pub async fn count_accounts(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Check if any accounts exist
    pub async fn has_accounts(&self) -> Result<bool, DbError> {
        Ok(self.count_accounts().await? > 0)
    }
}
