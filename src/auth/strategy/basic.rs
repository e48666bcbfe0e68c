use async_trait::async_trait;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::debug;

use super::{AuthStrategy, StrategyKind};
use crate::auth::{
    credentials::{Credential, authorization_header, parse_basic},
    error::StoreError,
    password::PasswordHasher,
    repository::{User, UserRepository},
};

/// `Authorization: Basic` checked against the stored digest on every request.
pub struct BasicAuth {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl BasicAuth {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BasicAuth
    }

    async fn resolve_identity(&self, headers: &HeaderMap) -> Result<Option<User>, StoreError> {
        let Some(Credential::Basic { identifier, secret }) =
            authorization_header(headers).and_then(parse_basic)
        else {
            return Ok(None);
        };
        let Some(user) = self.users.find_user_by_email(&identifier).await? else {
            self.hasher.verify_dummy_blocking(&secret).await;
            debug!("Basic credentials for unknown user");
            return Ok(None);
        };
        if self
            .hasher
            .verify_blocking(&user.hashed_password, &secret)
            .await
        {
            Ok(Some(user))
        } else {
            debug!("Basic credentials with wrong password for user {}", user.id);
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::repository::MemoryRepository;
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use base64::Engine;

    fn basic_header(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        );
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    async fn strategy_with_user(email: &str, password: &str) -> BasicAuth {
        let repo = Arc::new(MemoryRepository::new());
        let hasher = PasswordHasher::default();
        let digest = hasher.hash(password).unwrap();
        repo.add_user(email, &digest).await.unwrap();
        BasicAuth::new(repo, hasher)
    }

    #[tokio::test]
    async fn unknown_user_costs_a_verification() {
        let strategy = strategy_with_user("a@b.c", "secret").await;
        let before = strategy.hasher.verifications();
        assert!(strategy
            .resolve_identity(&basic_header("z@b.c:secret"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(strategy.hasher.verifications(), before + 1);

        assert!(strategy
            .resolve_identity(&basic_header("a@b.c:nope"))
            .await
            .unwrap()
            .is_none());
        assert_eq!(strategy.hasher.verifications(), before + 2);
    }

    #[tokio::test]
    async fn resolves_user_with_colon_in_password() {
        let strategy = strategy_with_user("a@b.c", "pa:ss").await;
        let user = strategy
            .resolve_identity(&basic_header("a@b.c:pa:ss"))
            .await
            .unwrap();
        assert_eq!(user.map(|user| user.email).as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_none() {
        let strategy = strategy_with_user("a@b.c", "secret").await;
        assert!(strategy
            .resolve_identity(&basic_header("a@b.c:nope"))
            .await
            .unwrap()
            .is_none());
        assert!(strategy
            .resolve_identity(&basic_header("z@b.c:secret"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn malformed_headers_are_none() {
        let strategy = strategy_with_user("a@b.c", "secret").await;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(strategy.resolve_identity(&headers).await.unwrap().is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert!(strategy.resolve_identity(&headers).await.unwrap().is_none());

        assert!(strategy
            .resolve_identity(&basic_header("no-colon"))
            .await
            .unwrap()
            .is_none());
        assert!(strategy
            .resolve_identity(&HeaderMap::new())
            .await
            .unwrap()
            .is_none());
    }
}
