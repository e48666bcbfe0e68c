use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{
    error_response,
    types::{MessageResponse, StatusResponse},
};

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome message", body = MessageResponse)
    ),
    tag = "warden"
)]
pub async fn welcome() -> impl IntoResponse {
    Json(MessageResponse {
        message: "Bienvenue".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/status",
    responses(
        (status = 200, description = "API is up", body = StatusResponse)
    ),
    tag = "warden"
)]
pub async fn status() -> impl IntoResponse {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/unauthorized",
    responses(
        (status = 401, description = "Always unauthorized", body = super::types::ErrorResponse)
    ),
    tag = "warden"
)]
pub async fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Unauthorized")
}

#[utoipa::path(
    get,
    path = "/api/v1/forbidden",
    responses(
        (status = 403, description = "Always forbidden", body = super::types::ErrorResponse)
    ),
    tag = "warden"
)]
pub async fn forbidden() -> Response {
    error_response(StatusCode::FORBIDDEN, "Forbidden")
}
