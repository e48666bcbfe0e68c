use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::debug;

use super::{
    credentials::credential_present, error::StoreError, exclusion::ExcludedPaths,
    repository::User, strategy::AuthStrategy,
};

/// Outcome of the gate for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Pass through. `None` when the path is excluded or auth is disabled.
    Allowed(Option<User>),
    /// No credential at all.
    Unauthenticated,
    /// A credential was present but resolved to nobody.
    Forbidden,
}

/// Runs exclusion, credential presence and identity resolution in order.
#[derive(Clone)]
pub struct RequestGate {
    strategy: Arc<dyn AuthStrategy>,
    excluded: ExcludedPaths,
    cookie_name: Option<String>,
}

impl RequestGate {
    #[must_use]
    pub fn new(
        strategy: Arc<dyn AuthStrategy>,
        excluded: ExcludedPaths,
        cookie_name: Option<String>,
    ) -> Self {
        Self {
            strategy,
            excluded,
            cookie_name,
        }
    }

    /// # Errors
    /// Store failures during identity resolution are returned as-is; they are
    /// not a decision about the caller.
    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> Result<Decision, StoreError> {
        if !self.strategy.require_auth(path, &self.excluded) {
            return Ok(Decision::Allowed(None));
        }
        if !credential_present(headers, self.cookie_name.as_deref()) {
            debug!("No credential on {path}");
            return Ok(Decision::Unauthenticated);
        }
        match self.strategy.resolve_identity(headers).await? {
            Some(user) => Ok(Decision::Allowed(Some(user))),
            None => {
                debug!("Credential on {path} did not resolve to a user");
                Ok(Decision::Forbidden)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{
        clock::SystemClock,
        password::PasswordHasher,
        repository::{MemoryRepository, UserRepository},
        strategy::{BasicAuth, NoAuth, SessionAuth, StrategyKind},
    };
    use async_trait::async_trait;
    use axum::http::{
        HeaderValue,
        header::{AUTHORIZATION, COOKIE},
    };

    const COOKIE_NAME: &str = "sid";

    fn excluded() -> ExcludedPaths {
        ExcludedPaths::new(["/api/v1/status/"])
    }

    fn with_header(name: axum::http::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn excluded_path_is_allowed_without_credentials() {
        let repo = Arc::new(MemoryRepository::new());
        let gate = RequestGate::new(
            Arc::new(BasicAuth::new(repo, PasswordHasher::default())),
            excluded(),
            None,
        );
        let decision = gate.evaluate("/api/v1/status", &HeaderMap::new()).await.unwrap();
        assert_eq!(decision, Decision::Allowed(None));
    }

    #[tokio::test]
    async fn missing_credential_is_unauthenticated() {
        let repo = Arc::new(MemoryRepository::new());
        let gate = RequestGate::new(
            Arc::new(BasicAuth::new(repo, PasswordHasher::default())),
            excluded(),
            None,
        );
        let decision = gate.evaluate("/api/v1/users/me", &HeaderMap::new()).await.unwrap();
        assert_eq!(decision, Decision::Unauthenticated);
    }

    #[tokio::test]
    async fn unresolvable_credential_is_forbidden() {
        let repo = Arc::new(MemoryRepository::new());
        let gate = RequestGate::new(
            Arc::new(BasicAuth::new(repo, PasswordHasher::default())),
            excluded(),
            None,
        );
        let headers = with_header(AUTHORIZATION, "Bearer token");
        let decision = gate.evaluate("/api/v1/users/me", &headers).await.unwrap();
        assert_eq!(decision, Decision::Forbidden);
    }

    #[tokio::test]
    async fn valid_session_is_allowed_with_user() {
        let repo = Arc::new(MemoryRepository::new());
        let user = repo.add_user("alice@example.com", "digest").await.unwrap();
        let strategy = Arc::new(SessionAuth::in_memory(
            repo,
            Some(COOKIE_NAME.to_string()),
            Arc::new(SystemClock),
        ));
        let token = strategy.create_session(&user.id).await.unwrap().unwrap();
        let gate = RequestGate::new(strategy, excluded(), Some(COOKIE_NAME.to_string()));

        let headers = with_header(COOKIE, &format!("{COOKIE_NAME}={token}"));
        let decision = gate.evaluate("/api/v1/users/me", &headers).await.unwrap();
        assert_eq!(decision, Decision::Allowed(Some(user)));

        let headers = with_header(COOKIE, &format!("{COOKIE_NAME}=forged"));
        let decision = gate.evaluate("/api/v1/users/me", &headers).await.unwrap();
        assert_eq!(decision, Decision::Forbidden);
    }

    #[tokio::test]
    async fn no_auth_allows_everything() {
        let gate = RequestGate::new(Arc::new(NoAuth), excluded(), None);
        let decision = gate.evaluate("/anything", &HeaderMap::new()).await.unwrap();
        assert_eq!(decision, Decision::Allowed(None));
    }

    #[tokio::test]
    async fn empty_exclusions_fail_open() {
        let repo = Arc::new(MemoryRepository::new());
        let gate = RequestGate::new(
            Arc::new(BasicAuth::new(repo, PasswordHasher::default())),
            ExcludedPaths::default(),
            None,
        );
        let decision = gate.evaluate("/api/v1/users/me", &HeaderMap::new()).await.unwrap();
        assert_eq!(decision, Decision::Allowed(None));
    }

    struct Unavailable;

    #[async_trait]
    impl AuthStrategy for Unavailable {
        fn kind(&self) -> StrategyKind {
            StrategyKind::BasicAuth
        }

        async fn resolve_identity(&self, _headers: &HeaderMap) -> Result<Option<User>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_a_decision() {
        let gate = RequestGate::new(Arc::new(Unavailable), excluded(), None);
        let headers = with_header(AUTHORIZATION, "Basic YTpi");
        let result = gate.evaluate("/api/v1/users/me", &headers).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
