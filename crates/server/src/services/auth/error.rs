//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors from the authentication service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login name or password is wrong (deliberately indistinguishable).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The login name is already taken for this role.
    #[error("login name already taken")]
    DuplicateLogin,

    /// Password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// A required registration field was empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Password hashing or verification failed internally.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}
