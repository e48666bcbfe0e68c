use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::{SessionRecord, SessionStore};
use crate::auth::{
    clock::Clock, error::StoreError, repository::SessionRepository,
    utils::generate_session_token,
};

/// Sessions written through a [`SessionRepository`], so they survive restarts
/// when the repository is durable.
pub struct RepositorySessionStore {
    repository: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl RepositorySessionStore {
    #[must_use]
    pub fn new(repository: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

#[async_trait]
impl SessionStore for RepositorySessionStore {
    async fn create(&self, user_id: &str) -> Result<String, StoreError> {
        let token = generate_session_token()?;
        let record = SessionRecord::new(&token, user_id, self.clock.now());
        self.repository.save_session_record(&record).await?;
        debug!("Persisted session for user {user_id}");
        Ok(token)
    }

    async fn record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.repository.find_session_record(token).await
    }

    async fn destroy(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.repository.delete_session_records(token).await? > 0)
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let purged = self.repository.purge_session_records_before(cutoff).await?;
        Ok(usize::try_from(purged).unwrap_or(usize::MAX))
    }
}
