//! Session login and logout.

use axum::{
    Form, Json,
    extract::{Extension, rejection::FormRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use super::{
    auth_error_response, error_response, not_found, required, store_unavailable,
    types::{CredentialsForm, UserResponse},
};
use crate::auth::{AuthConfig, AuthState, LoginOutcome, StrategyKind, utils::normalize_email};

#[utoipa::path(
    post,
    path = "/api/v1/auth_session/login",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in, session cookie set", body = UserResponse),
        (status = 400, description = "Email or password missing", body = super::types::ErrorResponse),
        (status = 401, description = "Wrong password", body = super::types::ErrorResponse),
        (status = 404, description = "No user for this email", body = super::types::ErrorResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let Some(email) = required(form.email.as_ref()).map(normalize_email) else {
        return error_response(StatusCode::BAD_REQUEST, "email missing");
    };
    let Some(password) = required(form.password.as_ref()) else {
        return error_response(StatusCode::BAD_REQUEST, "password missing");
    };

    let user = match auth_state.service().check_login(&email, password).await {
        Ok(LoginOutcome::Valid(user)) => user,
        Ok(LoginOutcome::UnknownUser) => {
            return error_response(StatusCode::NOT_FOUND, "no user found for this email");
        }
        Ok(LoginOutcome::WrongPassword) => {
            return error_response(StatusCode::UNAUTHORIZED, "wrong password");
        }
        Err(err) => return auth_error_response(&err),
    };

    let token = match auth_state.strategy().create_session(&user.id).await {
        Ok(token) => token,
        Err(err) => return store_unavailable(&err),
    };

    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        match session_cookie(auth_state.config(), &token) {
            Some(Ok(cookie)) => {
                headers.insert(SET_COOKIE, cookie);
            }
            Some(Err(err)) => {
                error!("Failed to build session cookie: {err}");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            }
            None => {}
        }
    }
    info!("User {} logged in", user.id);
    (StatusCode::OK, headers, Json(UserResponse::from(&user))).into_response()
}

#[utoipa::path(
    delete,
    path = "/api/v1/auth_session/logout",
    responses(
        (status = 200, description = "Session destroyed"),
        (status = 404, description = "No session to destroy", body = super::types::ErrorResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    match auth_state.strategy().destroy_session(&headers).await {
        Ok(true) => {
            let mut response_headers = HeaderMap::new();
            if let Some(Ok(cookie)) = clear_session_cookie(auth_state.config()) {
                response_headers.insert(SET_COOKIE, cookie);
            }
            (StatusCode::OK, response_headers, Json(json!({}))).into_response()
        }
        Ok(false) => not_found(),
        Err(err) => store_unavailable(&err),
    }
}

/// `HttpOnly` cookie carrying the session token, or `None` when no session
/// name is configured.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Option<Result<HeaderValue, InvalidHeaderValue>> {
    let name = config.session_name()?;
    let mut cookie = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax");
    let duration = config.session_duration_seconds();
    let expires = matches!(
        config.strategy(),
        StrategyKind::SessionExpAuth | StrategyKind::SessionDbAuth
    );
    if expires && duration > 0 {
        cookie.push_str(&format!("; Max-Age={duration}"));
    }
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    Some(HeaderValue::from_str(&cookie))
}

fn clear_session_cookie(config: &AuthConfig) -> Option<Result<HeaderValue, InvalidHeaderValue>> {
    let name = config.session_name()?;
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    Some(HeaderValue::from_str(&cookie))
}
