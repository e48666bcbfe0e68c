//! User-bound sessions: the session id lives on the user record and travels in
//! the `session_id` cookie, independent of the configured strategy.

use axum::{
    Form, Json,
    extract::{Extension, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use super::{
    auth_error_response, error_response, required,
    types::{CredentialsForm, RegisterResponse},
};
use crate::auth::{AuthState, credentials::extract_session_token, utils::normalize_email};

pub const USER_SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in, session_id cookie set", body = RegisterResponse),
        (status = 401, description = "Missing or invalid credentials", body = super::types::ErrorResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let (Some(email), Some(password)) = (
        required(form.email.as_ref()).map(normalize_email),
        required(form.password.as_ref()),
    ) else {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let service = auth_state.service();
    match service.valid_login(&email, password).await {
        Ok(true) => {}
        Ok(false) => return error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(err) => return auth_error_response(&err),
    }
    let session_id = match service.create_session(&email).await {
        Ok(Some(session_id)) => session_id,
        // removed between the password check and the update
        Ok(None) => return error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Err(err) => return auth_error_response(&err),
    };

    let cookie = format!("{USER_SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
    let cookie = match HeaderValue::from_str(&cookie) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session_id cookie: {err}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    info!("User-bound session opened");
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(RegisterResponse {
            email,
            message: "logged in".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    responses(
        (status = 303, description = "Session cleared, redirect to /"),
        (status = 403, description = "No user holds this session_id", body = super::types::ErrorResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let session_id = extract_session_token(&headers, Some(USER_SESSION_COOKIE));
    let service = auth_state.service();
    let user = match service.get_user_from_session_id(session_id.as_deref()).await {
        Ok(Some(user)) => user,
        Ok(None) => return error_response(StatusCode::FORBIDDEN, "Forbidden"),
        Err(err) => return auth_error_response(&err),
    };
    if let Err(err) = service.destroy_session(&user.id).await {
        return auth_error_response(&err);
    }
    info!("User-bound session closed for user {}", user.id);
    let clear = HeaderValue::from_static("session_id=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    ([(SET_COOKIE, clear)], Redirect::to("/")).into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Email of the session_id holder", body = ProfileResponse),
        (status = 403, description = "No user holds this session_id", body = super::types::ErrorResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn profile(headers: HeaderMap, auth_state: Extension<Arc<AuthState>>) -> Response {
    let session_id = extract_session_token(&headers, Some(USER_SESSION_COOKIE));
    match auth_state
        .service()
        .get_user_from_session_id(session_id.as_deref())
        .await
    {
        Ok(Some(user)) => Json(ProfileResponse { email: user.email }).into_response(),
        Ok(None) => error_response(StatusCode::FORBIDDEN, "Forbidden"),
        Err(err) => auth_error_response(&err),
    }
}
