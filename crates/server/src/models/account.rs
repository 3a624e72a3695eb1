//! Account domain types.
//!
//! One polymorphic account covers farmers, customers, and admins; the
//! role tag is the only thing that differs between them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paddyhouse_core::{AccountId, Role};

/// A registered account (domain type). The password hash never leaves
/// the auth service.
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID (shared sequence across all roles).
    pub id: AccountId,
    /// Which side of the marketplace this account belongs to.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Login name, unique per role.
    pub login_name: String,
    /// Contact email.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// The authenticated account stored in the session.
///
/// Deliberately small: just enough to authorize a request and greet the
/// user. Everything else is re-read from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub id: AccountId,
    pub role: Role,
    pub full_name: String,
}

impl CurrentAccount {
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
            full_name: account.full_name.clone(),
        }
    }
}
