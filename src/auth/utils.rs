//! Small helpers for token generation and email handling.

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use regex::Regex;

use super::error::StoreError;

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Create a new opaque session token: 256 random bits, URL-safe base64.
///
/// # Errors
/// Returns `StoreError::Backend` if the OS RNG fails.
pub fn generate_session_token() -> Result<String, StoreError> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| StoreError::Backend(format!("failed to generate session token: {err}")))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
