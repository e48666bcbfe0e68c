//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to an action, such as starting the API server
//! with its authentication settings.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if the DSN is not a valid postgres URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let dsn = match matches.get_one::<String>("dsn") {
        Some(dsn) => {
            let url = Url::parse(dsn).context("invalid WARDEN_DSN")?;
            if !matches!(url.scheme(), "postgres" | "postgresql") {
                anyhow::bail!("unsupported DSN scheme: {}", url.scheme());
            }
            Some(SecretString::from(dsn.clone()))
        }
        None => None,
    };

    let auth_opts = auth::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        apply_schema: matches.get_flag("apply-schema"),
        auth_type: auth_opts.auth_type,
        session_name: auth_opts.session_name,
        session_duration_seconds: auth_opts.session_duration_seconds,
        session_sweep_seconds: auth_opts.session_sweep_seconds,
        session_cookie_secure: auth_opts.session_cookie_secure,
        excluded_paths: auth_opts.excluded_paths,
    }))
}
