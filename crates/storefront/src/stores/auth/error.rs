//! Authentication error types.

use thiserror::Error;

use bazaar_core::Role;

use crate::backend::BackendError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] bazaar_core::EmailError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password rejected by the password policy.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The requested role cannot be chosen at sign-up.
    #[error("role {0} cannot be chosen at sign-up")]
    RoleNotSelfService(Role),

    /// The credential exists but has no identity row.
    #[error("no identity row for the signed-in user")]
    IdentityNotFound,

    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
