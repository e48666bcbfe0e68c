use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::debug;

use super::{AuthStrategy, StrategyKind};
use crate::auth::{
    clock::Clock,
    credentials::extract_session_token,
    error::StoreError,
    repository::{SessionRepository, User, UserRepository},
    store::{Expiring, MemorySessionStore, RepositorySessionStore, SessionStore},
};

/// Session-cookie authentication over any [`SessionStore`].
///
/// The expiring and persisted strategies are this type over a decorated store;
/// see [`SessionAuth::expiring`] and [`SessionAuth::persisted`].
pub struct SessionAuth {
    kind: StrategyKind,
    store: Arc<dyn SessionStore>,
    users: Arc<dyn UserRepository>,
    cookie_name: Option<String>,
}

impl SessionAuth {
    #[must_use]
    pub fn new(
        kind: StrategyKind,
        store: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
        cookie_name: Option<String>,
    ) -> Self {
        Self {
            kind,
            store,
            users,
            cookie_name,
        }
    }

    /// Sessions in process memory, never expiring.
    #[must_use]
    pub fn in_memory(
        users: Arc<dyn UserRepository>,
        cookie_name: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            StrategyKind::SessionAuth,
            Arc::new(MemorySessionStore::new(clock)),
            users,
            cookie_name,
        )
    }

    /// Sessions in process memory with a lifetime of `duration_seconds`.
    #[must_use]
    pub fn expiring(
        users: Arc<dyn UserRepository>,
        cookie_name: Option<String>,
        duration_seconds: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Expiring::new(
            MemorySessionStore::new(clock.clone()),
            duration_seconds,
            clock,
        );
        Self::new(
            StrategyKind::SessionExpAuth,
            Arc::new(store),
            users,
            cookie_name,
        )
    }

    /// Sessions persisted through `records`, with a lifetime of
    /// `duration_seconds`.
    #[must_use]
    pub fn persisted(
        users: Arc<dyn UserRepository>,
        records: Arc<dyn SessionRepository>,
        cookie_name: Option<String>,
        duration_seconds: i64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Expiring::new(
            RepositorySessionStore::new(records, clock.clone()),
            duration_seconds,
            clock,
        );
        Self::new(
            StrategyKind::SessionDbAuth,
            Arc::new(store),
            users,
            cookie_name,
        )
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    #[must_use]
    pub fn cookie_name(&self) -> Option<&str> {
        self.cookie_name.as_deref()
    }
}

#[async_trait]
impl AuthStrategy for SessionAuth {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    async fn resolve_identity(&self, headers: &HeaderMap) -> Result<Option<User>, StoreError> {
        let Some(token) = extract_session_token(headers, self.cookie_name()) else {
            return Ok(None);
        };
        let Some(user_id) = self.store.lookup(&token).await? else {
            debug!("Session cookie does not map to a live session");
            return Ok(None);
        };
        self.users.find_user_by_id(&user_id).await
    }

    async fn create_session(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.store.create(user_id).await.map(Some)
    }

    async fn destroy_session(&self, headers: &HeaderMap) -> Result<bool, StoreError> {
        let Some(token) = extract_session_token(headers, self.cookie_name()) else {
            return Ok(false);
        };
        self.store.destroy(&token).await
    }
}
