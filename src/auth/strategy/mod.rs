//! Authentication strategies.
//!
//! One strategy is active per deployment. All of them share the path-exclusion
//! rule; they differ in how a request's headers become a [`User`].

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use super::{error::StoreError, exclusion::ExcludedPaths, repository::User};

pub mod basic;
pub mod session;

pub use basic::BasicAuth;
pub use session::SessionAuth;

/// Configured strategy name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyKind {
    #[default]
    None,
    BasicAuth,
    SessionAuth,
    SessionExpAuth,
    SessionDbAuth,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BasicAuth => "basic_auth",
            Self::SessionAuth => "session_auth",
            Self::SessionExpAuth => "session_exp_auth",
            Self::SessionDbAuth => "session_db_auth",
        }
    }

    /// Parse a configured value, falling back to [`StrategyKind::None`] for
    /// unset or unknown names.
    #[must_use]
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            None => Self::None,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Unknown auth type {raw:?}, authentication is disabled");
                Self::None
            }),
        }
    }

    /// Whether this strategy issues session tokens.
    #[must_use]
    pub fn uses_sessions(self) -> bool {
        matches!(
            self,
            Self::SessionAuth | Self::SessionExpAuth | Self::SessionDbAuth
        )
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "" => Ok(Self::None),
            "basic_auth" => Ok(Self::BasicAuth),
            "session_auth" => Ok(Self::SessionAuth),
            "session_exp_auth" => Ok(Self::SessionExpAuth),
            "session_db_auth" => Ok(Self::SessionDbAuth),
            other => Err(format!("unknown auth type: {other}")),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn require_auth(&self, path: &str, excluded: &ExcludedPaths) -> bool {
        excluded.require_auth(path)
    }

    /// Identity carried by the request, or `None` when the credential is
    /// missing, malformed or wrong.
    async fn resolve_identity(&self, headers: &HeaderMap) -> Result<Option<User>, StoreError>;

    /// Open a session for `user_id`. `None` when the strategy has no sessions.
    async fn create_session(&self, _user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    /// Close the session carried by the request. `true` if one was removed.
    async fn destroy_session(&self, _headers: &HeaderMap) -> Result<bool, StoreError> {
        Ok(false)
    }
}

/// Authentication disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAuth;

#[async_trait]
impl AuthStrategy for NoAuth {
    fn kind(&self) -> StrategyKind {
        StrategyKind::None
    }

    fn require_auth(&self, _path: &str, _excluded: &ExcludedPaths) -> bool {
        false
    }

    async fn resolve_identity(&self, _headers: &HeaderMap) -> Result<Option<User>, StoreError> {
        Ok(None)
    }
}
