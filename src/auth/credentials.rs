//! Pulls raw credentials out of request headers.
//!
//! Every stage returns `Option`: malformed input is the same as no input and
//! never reaches the caller as an error.

use axum::http::{
    HeaderMap,
    header::{AUTHORIZATION, COOKIE},
};
use base64::Engine;

pub const BASIC_PREFIX: &str = "Basic ";

/// A credential carried by one request. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Basic { identifier: String, secret: String },
    Session { token: String },
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { identifier, .. } => f
                .debug_struct("Basic")
                .field("identifier", identifier)
                .field("secret", &"***")
                .finish(),
            Self::Session { .. } => f.debug_struct("Session").field("token", &"***").finish(),
        }
    }
}

/// Return the token after the case-sensitive `Basic ` prefix.
#[must_use]
pub fn extract_basic(header_value: &str) -> Option<&str> {
    header_value.strip_prefix(BASIC_PREFIX)
}

/// Standard base64 with padding, decoded to UTF-8.
#[must_use]
pub fn decode_basic(token: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(token)
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Split `identifier:secret` at the first colon, so secrets may contain colons.
#[must_use]
pub fn split_credentials(decoded: &str) -> Option<(String, String)> {
    let (identifier, secret) = decoded.split_once(':')?;
    Some((identifier.to_string(), secret.to_string()))
}

/// Run the whole Basic pipeline over an `Authorization` value.
#[must_use]
pub fn parse_basic(header_value: &str) -> Option<Credential> {
    let decoded = decode_basic(extract_basic(header_value)?)?;
    let (identifier, secret) = split_credentials(&decoded)?;
    Some(Credential::Basic { identifier, secret })
}

/// Raw `Authorization` header, if present and non-empty.
#[must_use]
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Value of the cookie named `cookie_name` across all `Cookie` headers.
///
/// `None` for the name means sessions are not configured, so there is never a
/// session credential. An empty cookie value counts as absent.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap, cookie_name: Option<&str>) -> Option<String> {
    let cookie_name = cookie_name?;
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let Some(key) = parts.next() else {
                continue;
            };
            let Some(val) = parts.next() else {
                continue;
            };
            if key.trim() == cookie_name {
                let val = val.trim();
                if val.is_empty() {
                    return None;
                }
                return Some(val.to_string());
            }
        }
    }
    None
}

/// Whether the request carries anything that could be a credential.
#[must_use]
pub fn credential_present(headers: &HeaderMap, cookie_name: Option<&str>) -> bool {
    authorization_header(headers).is_some() || extract_session_token(headers, cookie_name).is_some()
}
