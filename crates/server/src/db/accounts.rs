//! Account repository.
//!
//! One table serves all three roles; lookups are always scoped by role so
//! the same login name can exist as both a farmer and a customer.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use paddyhouse_core::{AccountId, Role};

use super::{RepositoryError, parse_enum};
use crate::models::Account;

/// Internal row type for account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i64,
    role: String,
    full_name: String,
    login_name: String,
    email: String,
    created_at: NaiveDateTime,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, RepositoryError> {
        Ok(Account {
            id: AccountId::new(self.id),
            role: parse_enum::<Role>("account.role", &self.role)?,
            full_name: self.full_name,
            login_name: self.login_name,
            email: self.email,
            created_at: self.created_at.and_utc(),
        })
    }
}

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if (role, `login_name`) is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        role: Role,
        full_name: &str,
        login_name: &str,
        password_hash: &str,
        email: &str,
    ) -> Result<Account, RepositoryError> {
        let row: AccountRow = sqlx::query_as(
            r"
            INSERT INTO account (role, full_name, login_name, password_hash, email)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, role, full_name, login_name, email, created_at
            ",
        )
        .bind(role.as_str())
        .bind(full_name)
        .bind(login_name)
        .bind(password_hash)
        .bind(email)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "login name {login_name} already exists for role {role}"
                ));
            }
            RepositoryError::Database(e)
        })?;

        row.into_account()
    }

    /// Get an account by role and login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_login(
        &self,
        role: Role,
        login_name: &str,
    ) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, role, full_name, login_name, email, created_at
            FROM account
            WHERE role = ?1 AND login_name = ?2
            ",
        )
        .bind(role.as_str())
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, role, full_name, login_name, email, created_at
            FROM account
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Get the stored password hash for a login, together with the account.
    ///
    /// Used only by the auth service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        role: Role,
        login_name: &str,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            #[sqlx(flatten)]
            account: AccountRow,
            password_hash: String,
        }

        let row: Option<HashRow> = sqlx::query_as(
            r"
            SELECT id, role, full_name, login_name, email, created_at, password_hash
            FROM account
            WHERE role = ?1 AND login_name = ?2
            ",
        )
        .bind(role.as_str())
        .bind(login_name)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.account.into_account()?, r.password_hash)))
            .transpose()
    }
}
