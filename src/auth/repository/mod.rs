//! Persistence boundary for users and persisted session records.
//!
//! Two implementations exist: [`memory::MemoryRepository`] for tests and
//! DSN-less runs, and [`crate::storage::PgRepository`] for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::StoreError;
use super::store::SessionRecord;

pub mod memory;

pub use memory::MemoryRepository;

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub hashed_password: String,
    #[serde(skip)]
    pub session_id: Option<String>,
    #[serde(skip)]
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New user with a random UUID id.
    #[must_use]
    pub fn new(email: &str, hashed_password: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            session_id: None,
            reset_token: None,
            created_at,
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("hashed_password", &"***")
            .field("session_id", &self.session_id.as_ref().map(|_| "***"))
            .field("reset_token", &self.reset_token.as_ref().map(|_| "***"))
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_session_id(&self, session_id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_reset_token(&self, reset_token: &str)
    -> Result<Option<User>, StoreError>;

    /// Insert a new user.
    ///
    /// # Errors
    /// `StoreError::Conflict` when the email is already registered.
    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError>;

    /// Overwrite the mutable fields of an existing user.
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn save_session_record(&self, record: &SessionRecord) -> Result<(), StoreError>;

    async fn find_session_record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Remove every record with this token and return how many went.
    async fn delete_session_records(&self, token: &str) -> Result<u64, StoreError>;

    async fn purge_session_records_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}
