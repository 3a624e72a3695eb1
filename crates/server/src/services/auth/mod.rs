//! Authentication service: the access/role gate.
//!
//! Registration and login for all three roles against the single account
//! table. Passwords are hashed with argon2; the session layer stores the
//! resulting `CurrentAccount`.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use paddyhouse_core::Role;

use crate::db::{AccountRepository, RepositoryError};
use crate::models::Account;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// Register a new account under a role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if a required field is empty.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::DuplicateLogin` if (role, login name) is taken.
    pub async fn register(
        &self,
        role: Role,
        full_name: &str,
        login_name: &str,
        password: &str,
        email: &str,
    ) -> Result<Account, AuthError> {
        if full_name.trim().is_empty() {
            return Err(AuthError::MissingField("full_name"));
        }
        if login_name.trim().is_empty() {
            return Err(AuthError::MissingField("login_name"));
        }

        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let account = self
            .accounts
            .create(role, full_name, login_name, &password_hash, email)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateLogin,
                other => AuthError::Repository(other),
            })?;

        Ok(account)
    }

    /// Login with role, login name, and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login name is unknown
    /// for this role or the password does not match.
    pub async fn login(
        &self,
        role: Role,
        login_name: &str,
        password: &str,
    ) -> Result<Account, AuthError> {
        let (account, password_hash) = self
            .accounts
            .get_password_hash(role, login_name)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(account)
    }
}

/// Validate password strength.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with argon2 and a fresh salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2 hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
