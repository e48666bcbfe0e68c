use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use super::{SessionRecord, SessionStore};
use crate::auth::{clock::Clock, error::StoreError};

/// Gives the sessions of `S` a fixed lifetime.
///
/// A record is live while `now <= created_at + duration`. Expired records are
/// reported as absent but stay in `S` until [`SessionStore::sweep`] purges
/// them. With no duration this is a pass-through.
pub struct Expiring<S> {
    inner: S,
    duration: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStore> Expiring<S> {
    /// Wrap `inner`. A duration of zero or less disables expiry, and so does
    /// one too large for chrono to represent.
    #[must_use]
    pub fn new(inner: S, duration_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        let duration = if duration_seconds > 0 {
            Duration::try_seconds(duration_seconds)
        } else {
            None
        };
        Self {
            inner,
            duration,
            clock,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn with_expiry(&self, mut record: SessionRecord) -> SessionRecord {
        // past the end of the calendar means never
        record.expires_at = self
            .duration
            .and_then(|duration| record.created_at.checked_add_signed(duration));
        record
    }

    fn is_live(&self, record: &SessionRecord) -> bool {
        record
            .expires_at
            .is_none_or(|expires_at| self.clock.now() <= expires_at)
    }
}

#[async_trait]
impl<S: SessionStore> SessionStore for Expiring<S> {
    async fn create(&self, user_id: &str) -> Result<String, StoreError> {
        self.inner.create(user_id).await
    }

    async fn record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self
            .inner
            .record(token)
            .await?
            .map(|record| self.with_expiry(record)))
    }

    async fn lookup(&self, token: &str) -> Result<Option<String>, StoreError> {
        let Some(record) = self.record(token).await? else {
            return Ok(None);
        };
        if self.is_live(&record) {
            Ok(Some(record.user_id))
        } else {
            debug!("Session for user {} expired", record.user_id);
            Ok(None)
        }
    }

    async fn destroy(&self, token: &str) -> Result<bool, StoreError> {
        self.inner.destroy(token).await
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        self.inner.purge_created_before(cutoff).await
    }

    async fn sweep(&self) -> Result<usize, StoreError> {
        let Some(duration) = self.duration else {
            return Ok(0);
        };
        let Some(cutoff) = self.clock.now().checked_sub_signed(duration) else {
            return Ok(0);
        };
        let purged = self.inner.purge_created_before(cutoff).await?;
        if purged > 0 {
            info!("Purged {purged} expired sessions");
        }
        Ok(purged)
    }
}
