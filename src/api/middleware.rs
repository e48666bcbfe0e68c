//! Runs the request gate in front of every route.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::handlers::{error_response, store_unavailable};
use crate::{
    auth::{AuthState, Decision, User},
    redact::{PII_FIELDS, REDACTION, filter_datum},
};

/// The authenticated user, attached to the request by [`authenticate`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

pub async fn authenticate(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if let Some(query) = request.uri().query() {
        if let Ok(filtered) = filter_datum(PII_FIELDS, REDACTION, query, "&") {
            debug!("Query for {path}: {filtered}");
        }
    }

    let decision = auth_state.gate().evaluate(&path, request.headers()).await;
    match decision {
        Ok(Decision::Allowed(user)) => {
            if let Some(user) = user {
                request.extensions_mut().insert(CurrentUser(user));
            }
            next.run(request).await
        }
        Ok(Decision::Unauthenticated) => error_response(StatusCode::UNAUTHORIZED, "Unauthorized"),
        Ok(Decision::Forbidden) => error_response(StatusCode::FORBIDDEN, "Forbidden"),
        Err(err) => store_unavailable(&err),
    }
}
