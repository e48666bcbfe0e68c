//! # Warden (authentication and session lifecycle)
//!
//! `warden` decides, for every inbound request, whether authentication is
//! needed, which identity the request carries, and manages the opaque session
//! tokens that stand in for that identity between requests.
//!
//! ## Strategies
//!
//! Exactly one strategy is active per deployment, selected by `WARDEN_AUTH_TYPE`:
//!
//! - `none` (also any unknown or unset value): no authentication at all.
//! - `basic_auth`: `Authorization: Basic` credentials checked against stored
//!   Argon2id digests on every request.
//! - `session_auth`: opaque session cookie backed by process memory.
//! - `session_exp_auth`: same, with `WARDEN_SESSION_DURATION` expiry.
//! - `session_db_auth`: same expiry, records persisted through the repository.
//!
//! > **Warning:** an unknown strategy name fails open. The server logs it at
//! > `warn` on startup.
//!
//! ## Exclusions
//!
//! Paths in the exclusion list skip the gate. Entries ending in `*` match by
//! prefix. An empty list means no path requires authentication.
//!
//! ## Expiry
//!
//! Session expiry is checked lazily when a token is looked up. Expired records
//! stay in the store until `--session-sweep-seconds` purges them.

pub mod api;
pub mod auth;
pub mod cli;
pub mod redact;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
