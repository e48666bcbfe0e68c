//! Password reset: issue a token, then redeem it with a new password.

use axum::{
    Form, Json,
    extract::{Extension, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    auth_error_response, message_response, required, store_unavailable,
    types::{RegisterResponse, ResetPasswordForm, ResetTokenResponse, UpdatePasswordForm},
};
use crate::auth::{AuthError, AuthState, UserRepository, utils::normalize_email};

#[utoipa::path(
    post,
    path = "/api/v1/reset_password",
    request_body(content = ResetPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reset token issued", body = ResetTokenResponse),
        (status = 400, description = "Email missing", body = super::types::MessageResponse),
        (status = 403, description = "Unknown email")
    ),
    tag = "users"
)]
pub async fn get_reset_password_token(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<ResetPasswordForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let Some(email) = required(form.email.as_ref()).map(normalize_email) else {
        return message_response(StatusCode::BAD_REQUEST, "email missing");
    };
    match auth_state.service().get_reset_password_token(&email).await {
        Ok(reset_token) => Json(ResetTokenResponse { email, reset_token }).into_response(),
        Err(AuthError::UnknownUser) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => auth_error_response(&err),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/reset_password",
    request_body(content = UpdatePasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Password updated", body = RegisterResponse),
        (status = 400, description = "Field missing", body = super::types::MessageResponse),
        (status = 403, description = "Invalid reset token")
    ),
    tag = "users"
)]
pub async fn update_password(
    auth_state: Extension<Arc<AuthState>>,
    form: Result<Form<UpdatePasswordForm>, FormRejection>,
) -> Response {
    let form = form.map(|Form(form)| form).unwrap_or_default();
    let Some(email) = required(form.email.as_ref()).map(normalize_email) else {
        return message_response(StatusCode::BAD_REQUEST, "email missing");
    };
    let Some(reset_token) = required(form.reset_token.as_ref()) else {
        return message_response(StatusCode::BAD_REQUEST, "reset_token missing");
    };
    let Some(new_password) = required(form.new_password.as_ref()) else {
        return message_response(StatusCode::BAD_REQUEST, "new_password missing");
    };

    // the token must belong to the account named in the form
    match auth_state.users().find_user_by_reset_token(reset_token).await {
        Ok(Some(holder)) if holder.email == email => {}
        Ok(_) => return StatusCode::FORBIDDEN.into_response(),
        Err(err) => return store_unavailable(&err),
    }

    match auth_state
        .service()
        .update_password(reset_token, new_password)
        .await
    {
        Ok(user) => Json(RegisterResponse {
            email: user.email,
            message: "Password updated".to_string(),
        })
        .into_response(),
        Err(AuthError::InvalidResetToken) => StatusCode::FORBIDDEN.into_response(),
        Err(err) => auth_error_response(&err),
    }
}
