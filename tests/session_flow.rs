#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    response::Response,
};
use base64::Engine;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use warden::{
    api,
    auth::{
        AuthConfig, AuthState, ManualClock, SessionRecord, SessionRepository, StoreError,
        StrategyKind, SystemClock, User, UserRepository, repository::MemoryRepository,
    },
};

const COOKIE_NAME: &str = "_my_session_id";

fn app(config: AuthConfig, clock: Arc<ManualClock>) -> Router {
    let repo = Arc::new(MemoryRepository::new());
    api::app(Arc::new(AuthState::new(config, repo.clone(), repo, clock)))
}

fn session_config(kind: StrategyKind) -> AuthConfig {
    AuthConfig::new(kind).with_session_name(Some(COOKIE_NAME.to_string()))
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ))
}

fn form(method: Method, path: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_cookie(method: Method, path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(COOKIE, format!("{COOKIE_NAME}={token}"))
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Token from `name=token; Path=/; ...`
fn session_token(response: &Response) -> Option<String> {
    let cookie = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let (pair, _) = cookie.split_once(';')?;
    let (name, token) = pair.split_once('=')?;
    (name == COOKIE_NAME).then(|| token.to_string())
}

async fn register_and_login(app: &Router) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(form(
            Method::POST,
            "/api/v1/users",
            "email=alice%40example.com&password=secret1",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(form(
            Method::POST,
            "/api/v1/auth_session/login",
            "email=alice%40example.com&password=secret1",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let token = session_token(&response);
    assert!(token.is_some());
    Ok(token.unwrap_or_default())
}

#[tokio::test]
async fn login_me_logout() -> anyhow::Result<()> {
    let app = app(session_config(StrategyKind::SessionAuth), clock());
    let token = register_and_login(&app).await?;

    let response = app
        .clone()
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", &token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["email"], "alice@example.com");

    let response = app
        .clone()
        .oneshot(with_cookie(
            Method::DELETE,
            "/api/v1/auth_session/logout",
            &token,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, serde_json::json!({}));

    // a destroyed token is still a credential, just not a valid one
    let response = app
        .clone()
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", &token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn each_login_issues_a_new_session() -> anyhow::Result<()> {
    let app = app(session_config(StrategyKind::SessionAuth), clock());
    let first = register_and_login(&app).await?;

    let response = app
        .clone()
        .oneshot(form(
            Method::POST,
            "/api/v1/auth_session/login",
            "email=alice%40example.com&password=secret1",
        ))
        .await?;
    let second = session_token(&response).unwrap_or_default();
    assert_ne!(first, second);

    for token in [&first, &second] {
        let response = app
            .clone()
            .oneshot(with_cookie(Method::GET, "/api/v1/users/me", token))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn expiring_session_lapses() -> anyhow::Result<()> {
    let clock = clock();
    let config = session_config(StrategyKind::SessionExpAuth).with_session_duration_seconds(60);
    let app = app(config, clock.clone());
    let token = register_and_login(&app).await?;

    clock.advance(Duration::seconds(60));
    let response = app
        .clone()
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", &token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance(Duration::seconds(1));
    let response = app
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", &token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn persisted_session_sets_max_age() -> anyhow::Result<()> {
    let config = session_config(StrategyKind::SessionDbAuth).with_session_duration_seconds(300);
    let app = app(config, clock());

    app.clone()
        .oneshot(form(
            Method::POST,
            "/api/v1/users",
            "email=bob%40example.com&password=pw",
        ))
        .await?;
    let response = app
        .clone()
        .oneshot(form(
            Method::POST,
            "/api/v1/auth_session/login",
            "email=bob%40example.com&password=pw",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=300"));

    let token = session_token(&response).unwrap_or_default();
    let response = app
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", &token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_without_session_is_404() -> anyhow::Result<()> {
    let config = session_config(StrategyKind::SessionAuth)
        .with_excluded_paths(warden::auth::ExcludedPaths::parse("/api/v1/auth_session/*"));
    let app = app(config, clock());

    let response = app
        .oneshot(with_cookie(
            Method::DELETE,
            "/api/v1/auth_session/logout",
            "never-issued",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[derive(Debug)]
struct DownRepository;

fn down() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl UserRepository for DownRepository {
    async fn find_user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn find_user_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn find_user_by_session_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn find_user_by_reset_token(&self, _token: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn add_user(&self, _email: &str, _hashed: &str) -> Result<User, StoreError> {
        Err(down())
    }

    async fn save_user(&self, _user: &User) -> Result<(), StoreError> {
        Err(down())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

#[async_trait]
impl SessionRepository for DownRepository {
    async fn save_session_record(&self, _record: &SessionRecord) -> Result<(), StoreError> {
        Err(down())
    }

    async fn find_session_record(&self, _token: &str) -> Result<Option<SessionRecord>, StoreError> {
        Err(down())
    }

    async fn delete_session_records(&self, _token: &str) -> Result<u64, StoreError> {
        Err(down())
    }

    async fn purge_session_records_before(
        &self,
        _cutoff: chrono::DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        Err(down())
    }
}

fn down_app(kind: StrategyKind) -> Router {
    let repo = Arc::new(DownRepository);
    let state = AuthState::new(
        session_config(kind),
        repo.clone(),
        repo,
        Arc::new(SystemClock),
    );
    api::app(Arc::new(state))
}

#[tokio::test]
async fn unavailable_backend_is_503() -> anyhow::Result<()> {
    let credentials = base64::engine::general_purpose::STANDARD.encode("alice@example.com:secret1");
    let response = down_app(StrategyKind::BasicAuth)
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/me")
                .header(AUTHORIZATION, format!("Basic {credentials}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = down_app(StrategyKind::SessionDbAuth)
        .oneshot(with_cookie(Method::GET, "/api/v1/users/me", "some-token"))
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = down_app(StrategyKind::SessionAuth)
        .oneshot(form(
            Method::POST,
            "/api/v1/auth_session/login",
            "email=alice%40example.com&password=secret1",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = down_app(StrategyKind::None)
        .oneshot(form(
            Method::POST,
            "/api/v1/sessions",
            "email=alice%40example.com&password=secret1",
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = down_app(StrategyKind::None)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
