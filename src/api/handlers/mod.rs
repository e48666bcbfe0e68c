//! Route handlers and the small response helpers they share.

pub mod health;
pub mod reset_password;
pub mod session;
pub mod status;
pub mod types;
pub mod user_session;
pub mod users;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::auth::{AuthError, StoreError};
use types::{ErrorResponse, MessageResponse};

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn message_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub(crate) fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// 503 for a failing backend. Never reported as an auth failure.
pub(crate) fn store_unavailable(err: &StoreError) -> Response {
    error!("Store failure: {err}");
    error_response(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
}

/// Map account-flow errors that have no endpoint-specific meaning.
pub(crate) fn auth_error_response(err: &AuthError) -> Response {
    match err {
        AuthError::Store(store) => store_unavailable(store),
        other => {
            error!("Auth flow failed: {other}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Form value that is present and not blank. Returned untrimmed.
pub(crate) fn required(value: Option<&String>) -> Option<&str> {
    value
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

pub(crate) async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank_values() {
        let blank = "   ".to_string();
        let value = " a@b.c ".to_string();
        assert_eq!(required(None), None);
        assert_eq!(required(Some(&blank)), None);
        assert_eq!(required(Some(&value)), Some(" a@b.c "));
    }

    #[test]
    fn helpers_set_status() {
        assert_eq!(not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            store_unavailable(&StoreError::Unavailable("down".to_string())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            auth_error_response(&AuthError::Hashing("bad".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
