use clap::{Arg, ArgMatches, Command};

use crate::auth::{ExcludedPaths, StrategyKind, exclusion::DEFAULT_EXCLUDED_PATHS};

pub const ARG_AUTH_TYPE: &str = "auth-type";
pub const ARG_SESSION_NAME: &str = "session-name";
pub const ARG_SESSION_DURATION: &str = "session-duration";
pub const ARG_SESSION_SWEEP_SECONDS: &str = "session-sweep-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_EXCLUDED_PATHS: &str = "excluded-paths";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let default_excluded: &'static str = Box::leak(DEFAULT_EXCLUDED_PATHS.join(",").into_boxed_str());
    command
        .arg(
            Arg::new(ARG_AUTH_TYPE)
                .long("auth-type")
                .help("Authentication strategy: none, basic_auth, session_auth, session_exp_auth, session_db_auth")
                .long_help(
                    "Authentication strategy. Unknown values disable authentication and are logged as a warning.",
                )
                .env("WARDEN_AUTH_TYPE"),
        )
        .arg(
            Arg::new(ARG_SESSION_NAME)
                .long("session-name")
                .help("Name of the session cookie")
                .env("WARDEN_SESSION_NAME"),
        )
        .arg(
            Arg::new(ARG_SESSION_DURATION)
                .long("session-duration")
                .help("Session lifetime in seconds, 0 or less never expires")
                .env("WARDEN_SESSION_DURATION")
                .default_value("0")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_SWEEP_SECONDS)
                .long("session-sweep-seconds")
                .help("Interval for purging expired sessions, 0 disables the sweep")
                .env("WARDEN_SESSION_SWEEP_SECONDS")
                .default_value("0")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long("session-cookie-secure")
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("WARDEN_SESSION_COOKIE_SECURE")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_EXCLUDED_PATHS)
                .long("excluded-paths")
                .help("Comma separated paths that skip authentication, a trailing * matches by prefix")
                .env("WARDEN_EXCLUDED_PATHS")
                .default_value(default_excluded),
        )
}

#[derive(Debug)]
pub struct Options {
    pub auth_type: StrategyKind,
    pub session_name: Option<String>,
    pub session_duration_seconds: i64,
    pub session_sweep_seconds: u64,
    pub session_cookie_secure: bool,
    pub excluded_paths: ExcludedPaths,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            auth_type: StrategyKind::parse_lenient(
                matches.get_one::<String>(ARG_AUTH_TYPE).map(String::as_str),
            ),
            session_name: matches.get_one::<String>(ARG_SESSION_NAME).cloned(),
            session_duration_seconds: matches
                .get_one::<i64>(ARG_SESSION_DURATION)
                .copied()
                .unwrap_or(0),
            session_sweep_seconds: matches
                .get_one::<u64>(ARG_SESSION_SWEEP_SECONDS)
                .copied()
                .unwrap_or(0),
            session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
            excluded_paths: matches
                .get_one::<String>(ARG_EXCLUDED_PATHS)
                .map(|csv| ExcludedPaths::parse(csv))
                .unwrap_or_default(),
        }
    }
}
