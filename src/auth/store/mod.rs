//! Session stores: token to session-record mappings.
//!
//! [`MemorySessionStore`] keeps records in process memory and
//! [`RepositorySessionStore`] writes them through a [`SessionRepository`].
//! Either can be wrapped in [`Expiring`] to get a session lifetime.
//!
//! [`SessionRepository`]: super::repository::SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StoreError;

pub mod expiring;
pub mod memory;
pub mod persisted;

pub use expiring::Expiring;
pub use memory::MemorySessionStore;
pub use persisted::RepositorySessionStore;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    #[must_use]
    pub fn new(token: &str, user_id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            token: token.to_string(),
            user_id: user_id.to_string(),
            created_at,
            expires_at: None,
        }
    }
}

impl std::fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRecord")
            .field("token", &"***")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session for `user_id` and return its fresh token.
    async fn create(&self, user_id: &str) -> Result<String, StoreError>;

    /// Raw record for `token`, with no expiry filtering.
    async fn record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// User id bound to `token`, if the session is live.
    async fn lookup(&self, token: &str) -> Result<Option<String>, StoreError> {
        Ok(self.record(token).await?.map(|record| record.user_id))
    }

    /// Remove the session. `true` only if a record existed.
    async fn destroy(&self, token: &str) -> Result<bool, StoreError>;

    /// Physically remove records created before `cutoff`.
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Purge expired records. Stores without a lifetime have nothing to do.
    async fn sweep(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}
