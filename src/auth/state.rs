//! Auth configuration and the shared state built from it at startup.

use std::sync::Arc;
use tracing::{info, warn};

use super::{
    clock::Clock,
    exclusion::ExcludedPaths,
    gate::RequestGate,
    password::PasswordHasher,
    repository::{SessionRepository, UserRepository},
    service::AuthService,
    store::SessionStore,
    strategy::{AuthStrategy, BasicAuth, NoAuth, SessionAuth, StrategyKind},
};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    strategy: StrategyKind,
    session_name: Option<String>,
    session_duration_seconds: i64,
    session_sweep_seconds: u64,
    session_cookie_secure: bool,
    excluded_paths: ExcludedPaths,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::None,
            session_name: None,
            session_duration_seconds: 0,
            session_sweep_seconds: 0,
            session_cookie_secure: false,
            excluded_paths: ExcludedPaths::defaults(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_session_name(mut self, name: Option<String>) -> Self {
        self.session_name = name.filter(|name| !name.is_empty());
        self
    }

    #[must_use]
    pub fn with_session_duration_seconds(mut self, seconds: i64) -> Self {
        self.session_duration_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_sweep_seconds(mut self, seconds: u64) -> Self {
        self.session_sweep_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_excluded_paths(mut self, excluded: ExcludedPaths) -> Self {
        self.excluded_paths = excluded;
        self
    }

    #[must_use]
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    #[must_use]
    pub fn session_name(&self) -> Option<&str> {
        self.session_name.as_deref()
    }

    #[must_use]
    pub fn session_duration_seconds(&self) -> i64 {
        self.session_duration_seconds
    }

    #[must_use]
    pub fn session_sweep_seconds(&self) -> u64 {
        self.session_sweep_seconds
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub fn excluded_paths(&self) -> &ExcludedPaths {
        &self.excluded_paths
    }
}

/// Everything the HTTP layer needs, built once and shared behind an `Arc`.
#[derive(Clone)]
pub struct AuthState {
    config: AuthConfig,
    strategy: Arc<dyn AuthStrategy>,
    gate: RequestGate,
    service: AuthService,
    users: Arc<dyn UserRepository>,
    sessions: Option<Arc<dyn SessionStore>>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserRepository>,
        session_records: Arc<dyn SessionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let hasher = PasswordHasher::default();
        let cookie_name = config.session_name.clone();
        if config.strategy.uses_sessions() && cookie_name.is_none() {
            warn!("No session name configured, session cookies will be ignored");
        }
        if config.excluded_paths.is_empty() && config.strategy != StrategyKind::None {
            warn!("Exclusion list is empty, no path requires authentication");
        }

        let duration = config.session_duration_seconds;
        let (strategy, sessions): (Arc<dyn AuthStrategy>, Option<Arc<dyn SessionStore>>) =
            match config.strategy {
                StrategyKind::None => (Arc::new(NoAuth), None),
                StrategyKind::BasicAuth => (
                    Arc::new(BasicAuth::new(users.clone(), hasher.clone())),
                    None,
                ),
                StrategyKind::SessionAuth => {
                    let session = SessionAuth::in_memory(users.clone(), cookie_name.clone(), clock);
                    let store = session.store();
                    (Arc::new(session), Some(store))
                }
                StrategyKind::SessionExpAuth => {
                    let session =
                        SessionAuth::expiring(users.clone(), cookie_name.clone(), duration, clock);
                    let store = session.store();
                    (Arc::new(session), Some(store))
                }
                StrategyKind::SessionDbAuth => {
                    let session = SessionAuth::persisted(
                        users.clone(),
                        session_records,
                        cookie_name.clone(),
                        duration,
                        clock,
                    );
                    let store = session.store();
                    (Arc::new(session), Some(store))
                }
            };
        info!("Authentication strategy: {}", config.strategy);

        let gate = RequestGate::new(
            strategy.clone(),
            config.excluded_paths.clone(),
            cookie_name,
        );
        Self {
            service: AuthService::new(users.clone(), hasher),
            config,
            strategy,
            gate,
            users,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn strategy(&self) -> &Arc<dyn AuthStrategy> {
        &self.strategy
    }

    #[must_use]
    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }

    #[must_use]
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Session store of the active strategy, if it has one.
    #[must_use]
    pub fn sessions(&self) -> Option<&Arc<dyn SessionStore>> {
        self.sessions.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{clock::SystemClock, repository::MemoryRepository};

    fn state(config: AuthConfig) -> AuthState {
        let repo = Arc::new(MemoryRepository::new());
        AuthState::new(config, repo.clone(), repo, Arc::new(SystemClock))
    }

    #[test]
    fn config_builder() {
        let config = AuthConfig::new(StrategyKind::SessionExpAuth)
            .with_session_name(Some("sid".to_string()))
            .with_session_duration_seconds(60)
            .with_session_sweep_seconds(30)
            .with_session_cookie_secure(true)
            .with_excluded_paths(ExcludedPaths::parse("/a/,/b*"));
        assert_eq!(config.strategy(), StrategyKind::SessionExpAuth);
        assert_eq!(config.session_name(), Some("sid"));
        assert_eq!(config.session_duration_seconds(), 60);
        assert_eq!(config.session_sweep_seconds(), 30);
        assert!(config.session_cookie_secure());
        assert_eq!(config.excluded_paths().entries().len(), 2);
    }

    #[test]
    fn empty_session_name_is_unset() {
        let config = AuthConfig::default().with_session_name(Some(String::new()));
        assert_eq!(config.session_name(), None);
    }

    #[test]
    fn state_selects_strategy_and_store() {
        for (kind, has_store) in [
            (StrategyKind::None, false),
            (StrategyKind::BasicAuth, false),
            (StrategyKind::SessionAuth, true),
            (StrategyKind::SessionExpAuth, true),
            (StrategyKind::SessionDbAuth, true),
        ] {
            let state = state(AuthConfig::new(kind).with_session_name(Some("sid".to_string())));
            assert_eq!(state.strategy().kind(), kind);
            assert_eq!(state.sessions().is_some(), has_store);
        }
    }
}
