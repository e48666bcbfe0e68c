use axum::{
    Form, Json,
    extract::{Extension, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    auth_error_response, message_response, not_found, required,
    types::{CredentialsForm, RegisterResponse, UserResponse},
};
use crate::{
    api::middleware::CurrentUser,
    auth::{
        AuthError, AuthState,
        utils::{normalize_email, valid_email},
    },
};

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body(content = CredentialsForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created", body = RegisterResponse),
        (status = 400, description = "Invalid input or email already registered", body = super::types::MessageResponse),
        (status = 503, description = "Backend unavailable", body = super::types::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<CredentialsForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let Some(email) = required(form.email.as_ref()).map(normalize_email) else {
        return message_response(StatusCode::BAD_REQUEST, "email missing");
    };
    if !valid_email(&email) {
        return message_response(StatusCode::BAD_REQUEST, "invalid email");
    }
    let Some(password) = required(form.password.as_ref()) else {
        return message_response(StatusCode::BAD_REQUEST, "password missing");
    };

    match auth_state.service().register_user(&email, password).await {
        Ok(user) => (
            StatusCode::OK,
            Json(RegisterResponse {
                email: user.email,
                message: "user created".to_string(),
            }),
        )
            .into_response(),
        Err(AuthError::EmailTaken(_)) => {
            message_response(StatusCode::BAD_REQUEST, "email already registered")
        }
        Err(err) => auth_error_response(&err),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 404, description = "No authenticated user on this request", body = super::types::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn me(current_user: Option<Extension<CurrentUser>>) -> Response {
    match current_user {
        Some(Extension(CurrentUser(user))) => Json(UserResponse::from(&user)).into_response(),
        None => not_found(),
    }
}
