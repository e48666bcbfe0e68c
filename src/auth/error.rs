use thiserror::Error;

/// Failures of the backing stores (session store, user repository).
///
/// These are never folded into "not found": a request that hits one of them
/// fails with 503 instead of being reported as an authentication failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("record conflict: {0}")]
    Conflict(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Errors of the account flows in [`super::service::AuthService`].
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user {0} already exists")]
    EmailTaken(String),
    #[error("no user found for this email")]
    UnknownUser,
    #[error("invalid reset token")]
    InvalidResetToken,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
