use crate::{
    api,
    auth::{
        AuthConfig, AuthState, Clock, ExcludedPaths, SessionRepository, StrategyKind, SystemClock,
        UserRepository, repository::memory::MemoryRepository,
    },
    storage::PgRepository,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub apply_schema: bool,
    pub auth_type: StrategyKind,
    pub session_name: Option<String>,
    pub session_duration_seconds: i64,
    pub session_sweep_seconds: u64,
    pub session_cookie_secure: bool,
    pub excluded_paths: ExcludedPaths,
}

impl Args {
    fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.auth_type)
            .with_session_name(self.session_name.clone())
            .with_session_duration_seconds(self.session_duration_seconds)
            .with_session_sweep_seconds(self.session_sweep_seconds)
            .with_session_cookie_secure(self.session_cookie_secure)
            .with_excluded_paths(self.excluded_paths.clone())
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable, the schema cannot be
/// applied, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let (users, records): (Arc<dyn UserRepository>, Arc<dyn SessionRepository>) =
        if let Some(dsn) = &args.dsn {
            let repository = Arc::new(
                PgRepository::connect(dsn.expose_secret())
                    .await
                    .context("Failed to connect to database")?,
            );
            if args.apply_schema {
                repository
                    .apply_schema()
                    .await
                    .context("Failed to apply database schema")?;
            }
            (repository.clone(), repository)
        } else {
            warn!("No DSN configured, users and sessions are kept in process memory");
            let repository = Arc::new(MemoryRepository::new());
            (repository.clone(), repository)
        };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let auth_state = Arc::new(AuthState::new(args.auth_config(), users, records, clock));

    api::new(args.port, auth_state).await
}

fn log_startup_args(args: &Args) {
    let backend = if args.dsn.is_some() {
        "postgres"
    } else {
        "memory"
    };
    info!(
        port = args.port,
        backend,
        auth_type = %args.auth_type,
        session_duration_seconds = args.session_duration_seconds,
        session_sweep_seconds = args.session_sweep_seconds,
        excluded_paths = args.excluded_paths.entries().len(),
        "Starting warden"
    );
}
