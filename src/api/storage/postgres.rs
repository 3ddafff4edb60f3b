//! `PostgreSQL` implementation of the store traits.

use anyhow::{Context, Result};
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument, Span};

use super::{
    BoxFuture, CredentialStore, FeedbackLedger, FeedbackRecord, InsertOutcome, LeaderboardRow,
    ScoreLedger, SessionRecord, SessionStore, UserRecord,
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Create the tables and indexes if they are missing.
///
/// # Errors
/// Returns an error if any schema statement fails.
pub async fn apply_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .instrument(db_span("CREATE", "sql/schema.sql"))
        .await
        .context("failed to apply database schema")?;
    Ok(())
}

fn db_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgStore {
    fn insert_user<'a>(
        &'a self,
        username: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<InsertOutcome>> {
        Box::pin(async move {
            let query = "INSERT INTO users (username, password_hash) VALUES ($1, $2)";
            let result = sqlx::query(query)
                .bind(username)
                .bind(password_hash)
                .execute(&self.pool)
                .instrument(db_span("INSERT", query))
                .await;

            match result {
                Ok(_) => Ok(InsertOutcome::Created),
                Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
                Err(err) => Err(err).context("failed to insert user"),
            }
        })
    }

    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<UserRecord>>> {
        Box::pin(async move {
            let query = "SELECT user_id, username, password_hash FROM users WHERE username = $1";
            let row = sqlx::query(query)
                .bind(username)
                .fetch_optional(&self.pool)
                .instrument(db_span("SELECT", query))
                .await
                .context("failed to lookup user")?;

            Ok(row.map(|row| UserRecord {
                user_id: row.get("user_id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
            }))
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self
                .pool
                .acquire()
                .instrument(info_span!(
                    "db.acquire",
                    db.system = "postgresql",
                    db.operation = "ACQUIRE"
                ))
                .await
                .context("failed to acquire database connection")?;
            conn.ping()
                .instrument(info_span!(
                    "db.ping",
                    db.system = "postgresql",
                    db.operation = "PING"
                ))
                .await
                .context("failed to ping database")
        })
    }
}

impl SessionStore for PgStore {
    fn create<'a>(
        &'a self,
        session_hash: &'a [u8],
        authenticated: bool,
        ttl_seconds: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let query = r"
                INSERT INTO sessions (session_hash, authenticated, expires_at)
                VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
            ";
            sqlx::query(query)
                .bind(session_hash)
                .bind(authenticated)
                .bind(ttl_seconds)
                .execute(&self.pool)
                .instrument(db_span("INSERT", query))
                .await
                .context("failed to create session")?;
            Ok(())
        })
    }

    fn lookup<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<Option<SessionRecord>>> {
        Box::pin(async move {
            let query =
                "SELECT authenticated FROM sessions WHERE session_hash = $1 AND expires_at > NOW()";
            let row = sqlx::query(query)
                .bind(session_hash)
                .fetch_optional(&self.pool)
                .instrument(db_span("SELECT", query))
                .await
                .context("failed to lookup session")?;

            Ok(row.map(|row| SessionRecord {
                authenticated: row.get("authenticated"),
            }))
        })
    }

    fn mark_authenticated<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let query = r"
                UPDATE sessions SET authenticated = TRUE
                WHERE session_hash = $1 AND expires_at > NOW()
            ";
            let result = sqlx::query(query)
                .bind(session_hash)
                .execute(&self.pool)
                .instrument(db_span("UPDATE", query))
                .await
                .context("failed to authenticate session")?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn destroy<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            // Expired rows are swept here too so the table does not grow unbounded.
            let query = "DELETE FROM sessions WHERE session_hash = $1 OR expires_at <= NOW()";
            sqlx::query(query)
                .bind(session_hash)
                .execute(&self.pool)
                .instrument(db_span("DELETE", query))
                .await
                .context("failed to destroy session")?;
            Ok(())
        })
    }
}

impl ScoreLedger for PgStore {
    fn insert_score<'a>(
        &'a self,
        username: &'a str,
        level: i64,
        score: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let query = "INSERT INTO scores (username, level, high_score) VALUES ($1, $2, $3)";
            sqlx::query(query)
                .bind(username)
                .bind(level)
                .bind(score)
                .execute(&self.pool)
                .instrument(db_span("INSERT", query))
                .await
                .context("failed to insert score")?;
            Ok(())
        })
    }

    fn leaderboard(&self) -> BoxFuture<'_, Result<Vec<LeaderboardRow>>> {
        Box::pin(async move {
            let query = r"
                SELECT username, level, high_score FROM (
                    SELECT DISTINCT ON (username) username, level, high_score
                    FROM scores
                    ORDER BY username, high_score DESC, level DESC
                ) best
                ORDER BY high_score DESC, level DESC, username ASC
            ";
            let rows = sqlx::query(query)
                .fetch_all(&self.pool)
                .instrument(db_span("SELECT", query))
                .await
                .context("failed to read leaderboard")?;

            Ok(rows
                .into_iter()
                .map(|row| LeaderboardRow {
                    username: row.get("username"),
                    level: row.get("level"),
                    high_score: row.get("high_score"),
                })
                .collect())
        })
    }
}

impl FeedbackLedger for PgStore {
    fn insert_feedback<'a>(
        &'a self,
        username: &'a str,
        feedback: Option<&'a str>,
        rating: Option<i32>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let query = "INSERT INTO feedback (username, feedback, rating) VALUES ($1, $2, $3)";
            sqlx::query(query)
                .bind(username)
                .bind(feedback)
                .bind(rating)
                .execute(&self.pool)
                .instrument(db_span("INSERT", query))
                .await
                .context("failed to insert feedback")?;
            Ok(())
        })
    }

    fn feedback_for<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>> {
        Box::pin(async move {
            let query =
                "SELECT feedback, rating FROM feedback WHERE username = $1 ORDER BY feedback_id";
            let rows = sqlx::query(query)
                .bind(username)
                .fetch_all(&self.pool)
                .instrument(db_span("SELECT", query))
                .await
                .context("failed to read feedback")?;

            Ok(rows
                .into_iter()
                .map(|row| FeedbackRecord {
                    feedback: row.get("feedback"),
                    rating: row.get("rating"),
                })
                .collect())
        })
    }
}
