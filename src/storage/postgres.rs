//! PostgreSQL repository for users and persisted sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::time::Duration;
use tracing::{Instrument, info, info_span};

use crate::auth::{
    error::StoreError,
    repository::{SessionRepository, User, UserRepository},
    store::SessionRecord,
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::Unavailable(err.to_string()),
            _ if is_unique_violation(&err) => Self::Conflict(err.to_string()),
            _ => Self::Backend(err.to_string()),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn db_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        hashed_password: row.try_get("hashed_password")?,
        session_id: row.try_get("session_id")?,
        reset_token: row.try_get("reset_token")?,
        created_at: row.try_get("created_at")?,
    })
}

#[derive(Clone, Debug)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool to `dsn`.
    ///
    /// # Errors
    /// Returns `StoreError::Unavailable` if the database cannot be reached.
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any statement fails.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
        {
            sqlx::query(statement)
                .execute(&self.pool)
                .instrument(info_span!(
                    "db.query",
                    db.system = "postgresql",
                    db.operation = "DDL"
                ))
                .await?;
        }
        info!("Database schema applied");
        Ok(())
    }

    async fn find_user_where(
        &self,
        query: &'static str,
        value: &str,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        const QUERY: &str = "SELECT id, email, hashed_password, session_id, reset_token, created_at FROM users WHERE email = $1";
        self.find_user_where(QUERY, email).await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        const QUERY: &str = "SELECT id, email, hashed_password, session_id, reset_token, created_at FROM users WHERE id = $1";
        self.find_user_where(QUERY, id).await
    }

    async fn find_user_by_session_id(&self, session_id: &str) -> Result<Option<User>, StoreError> {
        const QUERY: &str = "SELECT id, email, hashed_password, session_id, reset_token, created_at FROM users WHERE session_id = $1";
        self.find_user_where(QUERY, session_id).await
    }

    async fn find_user_by_reset_token(
        &self,
        reset_token: &str,
    ) -> Result<Option<User>, StoreError> {
        const QUERY: &str = "SELECT id, email, hashed_password, session_id, reset_token, created_at FROM users WHERE reset_token = $1";
        self.find_user_where(QUERY, reset_token).await
    }

    async fn add_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        let query = r"
            INSERT INTO users (id, email, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, hashed_password, session_id, reset_token, created_at
        ";
        let row = sqlx::query(query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(email)
            .bind(hashed_password)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;
        Ok(user_from_row(&row)?)
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let query = r"
            UPDATE users
            SET email = $2, hashed_password = $3, session_id = $4, reset_token = $5
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .bind(&user.session_id)
            .bind(&user.reset_token)
            .execute(&self.pool)
            .instrument(db_span("UPDATE", query))
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!("user {} not found", user.id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let query = "SELECT 1";
        sqlx::query(query)
            .execute(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for PgRepository {
    async fn save_session_record(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let query = "INSERT INTO user_sessions (session_id, user_id, created_at) VALUES ($1, $2, $3)";
        sqlx::query(query)
            .bind(&record.token)
            .bind(&record.user_id)
            .bind(record.created_at)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;
        Ok(())
    }

    async fn find_session_record(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        let query = r"
            SELECT session_id, user_id, created_at
            FROM user_sessions
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT 1
        ";
        let row = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let session_id: String = row.try_get("session_id")?;
        let user_id: String = row.try_get("user_id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok(Some(SessionRecord::new(&session_id, &user_id, created_at)))
    }

    async fn delete_session_records(&self, token: &str) -> Result<u64, StoreError> {
        let query = "DELETE FROM user_sessions WHERE session_id = $1";
        let result = sqlx::query(query)
            .bind(token)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_session_records_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let query = "DELETE FROM user_sessions WHERE created_at < $1";
        let result = sqlx::query(query)
            .bind(cutoff)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(matches!(StoreError::from(err), StoreError::Conflict(_)));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("42P01"),
        }));
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));
    }

    #[test]
    fn connection_failures_are_unavailable() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_unavailable());
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(StoreError::from(sqlx::Error::Io(io)).is_unavailable());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_unavailable());
    }

    #[test]
    fn schema_defines_both_tables() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS user_sessions"));
    }

    #[tokio::test]
    async fn unreachable_database_reports_unavailable() {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://warden@127.0.0.1:1/warden");
        assert!(pool.is_ok());
        if let Ok(pool) = pool {
            let repo = PgRepository::new(pool);
            let result = repo.find_user_by_email("a@b.c").await;
            assert!(matches!(result, Err(StoreError::Unavailable(_))));
        }
    }
}
