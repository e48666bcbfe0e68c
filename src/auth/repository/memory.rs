use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{SessionRepository, User, UserRepository};
use crate::auth::{error::StoreError, store::SessionRecord};

/// Process-local repository. Users are keyed by id; session records by token.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_user_by(&self, matches: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| matches(user))
            .cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_user_by(|user| user.email == email).await)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_user_by_session_id(&self, session_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .find_user_by(|user| user.session_id.as_deref() == Some(session_id))
            .await)
    }

    async fn find_user_by_reset_token(
        &self,
        reset_token: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .find_user_by(|user| user.reset_token.as_deref() == Some(reset_token))
            .await)
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Err(StoreError::Conflict(format!("email {email} already exists")));
        }
        let user = User::new(email, hashed_password, Utc::now());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!("user {} not found", user.id))),
        }
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn save_session_record(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&record.token) {
            return Err(StoreError::Conflict("session token already exists".to_string()));
        }
        sessions.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn find_session_record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn delete_session_records(&self, token: &str) -> Result<u64, StoreError> {
        Ok(u64::from(self.sessions.write().await.remove(token).is_some()))
    }

    async fn purge_session_records_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.created_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}
