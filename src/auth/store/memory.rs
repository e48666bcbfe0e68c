use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::{SessionRecord, SessionStore};
use crate::auth::{
    clock::{Clock, SystemClock},
    error::StoreError,
    utils::generate_session_token,
};

/// Sessions held in process memory. Lost on restart.
#[derive(Debug)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: &str) -> Result<String, StoreError> {
        let token = generate_session_token()?;
        let record = SessionRecord::new(&token, user_id, self.clock.now());
        self.records.write().await.insert(token.clone(), record);
        debug!("Created in-memory session for user {user_id}");
        Ok(token)
    }

    async fn record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.read().await.get(token).cloned())
    }

    async fn destroy(&self, token: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(token).is_some())
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.created_at >= cutoff);
        Ok(before - records.len())
    }
}
