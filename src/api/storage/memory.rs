//! In-memory store used by handler tests.

use anyhow::{anyhow, Result};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
    time::{Duration, Instant},
};

use super::{
    BoxFuture, CredentialStore, FeedbackLedger, FeedbackRecord, InsertOutcome, LeaderboardRow,
    ScoreLedger, SessionRecord, SessionStore, UserRecord,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    sessions: HashMap<Vec<u8>, (bool, Instant)>,
    scores: Vec<LeaderboardRow>,
    feedback: Vec<(String, FeedbackRecord)>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Make every subsequent call fail, as an unreachable database would.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn session_count(&self) -> usize {
        self.tables.lock().map_or(0, |tables| tables.sessions.len())
    }

    pub(crate) fn stored_password_hash(&self, username: &str) -> Option<String> {
        self.tables.lock().ok().and_then(|tables| {
            tables
                .users
                .iter()
                .find(|user| user.username == username)
                .map(|user| user.password_hash.clone())
        })
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("store unavailable"));
        }
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl CredentialStore for MemoryStore {
    fn insert_user<'a>(
        &'a self,
        username: &'a str,
        password_hash: &'a str,
    ) -> BoxFuture<'a, Result<InsertOutcome>> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            if tables.users.iter().any(|user| user.username == username) {
                return Ok(InsertOutcome::Conflict);
            }
            let user_id = i64::try_from(tables.users.len())? + 1;
            tables.users.push(UserRecord {
                user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            });
            Ok(InsertOutcome::Created)
        })
    }

    fn find_user<'a>(&'a self, username: &'a str) -> BoxFuture<'a, Result<Option<UserRecord>>> {
        Box::pin(async move {
            let tables = self.tables()?;
            Ok(tables
                .users
                .iter()
                .find(|user| user.username == username)
                .cloned())
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.tables().map(|_| ()) })
    }
}

impl SessionStore for MemoryStore {
    fn create<'a>(
        &'a self,
        session_hash: &'a [u8],
        authenticated: bool,
        ttl_seconds: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let ttl = Duration::from_secs(u64::try_from(ttl_seconds).unwrap_or(0));
            let mut tables = self.tables()?;
            tables
                .sessions
                .insert(session_hash.to_vec(), (authenticated, Instant::now() + ttl));
            Ok(())
        })
    }

    fn lookup<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<Option<SessionRecord>>> {
        Box::pin(async move {
            let tables = self.tables()?;
            Ok(tables
                .sessions
                .get(session_hash)
                .filter(|(_, expires_at)| *expires_at > Instant::now())
                .map(|(authenticated, _)| SessionRecord {
                    authenticated: *authenticated,
                }))
        })
    }

    fn mark_authenticated<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            match tables.sessions.get_mut(session_hash) {
                Some((authenticated, expires_at)) if *expires_at > Instant::now() => {
                    *authenticated = true;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn destroy<'a>(&'a self, session_hash: &'a [u8]) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            tables.sessions.remove(session_hash);
            Ok(())
        })
    }
}

impl ScoreLedger for MemoryStore {
    fn insert_score<'a>(
        &'a self,
        username: &'a str,
        level: i64,
        score: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            tables.scores.push(LeaderboardRow {
                username: username.to_string(),
                level,
                high_score: score,
            });
            Ok(())
        })
    }

    fn leaderboard(&self) -> BoxFuture<'_, Result<Vec<LeaderboardRow>>> {
        Box::pin(async move {
            let tables = self.tables()?;
            let mut best: HashMap<&str, &LeaderboardRow> = HashMap::new();
            for row in &tables.scores {
                best.entry(row.username.as_str())
                    .and_modify(|current| {
                        if (row.high_score, row.level) > (current.high_score, current.level) {
                            *current = row;
                        }
                    })
                    .or_insert(row);
            }

            let mut rows: Vec<LeaderboardRow> = best.into_values().cloned().collect();
            rows.sort_by(|a, b| {
                b.high_score
                    .cmp(&a.high_score)
                    .then(b.level.cmp(&a.level))
                    .then(a.username.cmp(&b.username))
            });
            Ok(rows)
        })
    }
}

impl FeedbackLedger for MemoryStore {
    fn insert_feedback<'a>(
        &'a self,
        username: &'a str,
        feedback: Option<&'a str>,
        rating: Option<i32>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let mut tables = self.tables()?;
            tables.feedback.push((
                username.to_string(),
                FeedbackRecord {
                    feedback: feedback.map(str::to_string),
                    rating,
                },
            ));
            Ok(())
        })
    }

    fn feedback_for<'a>(
        &'a self,
        username: &'a str,
    ) -> BoxFuture<'a, Result<Vec<FeedbackRecord>>> {
        Box::pin(async move {
            let tables = self.tables()?;
            Ok(tables
                .feedback
                .iter()
                .filter(|(author, _)| author == username)
                .map(|(_, record)| record.clone())
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn leaderboard_keeps_best_row_per_player() -> Result<()> {
        let store = MemoryStore::default();
        store.insert_score("alice", 3, 42).await?;
        store.insert_score("alice", 4, 17).await?;
        store.insert_score("bob", 1, 42).await?;
        store.insert_score("bob", 5, 42).await?;
        store.insert_score("carol", 9, 5).await?;

        let rows = store.leaderboard().await?;
        let summary: Vec<(&str, i64, i64)> = rows
            .iter()
            .map(|row| (row.username.as_str(), row.level, row.high_score))
            .collect();
        assert_eq!(
            summary,
            vec![("bob", 5, 42), ("alice", 3, 42), ("carol", 9, 5)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible() -> Result<()> {
        let store = MemoryStore::default();
        store.create(b"expired", true, 0).await?;
        assert_eq!(store.lookup(b"expired").await?, None);
        assert!(!store.mark_authenticated(b"expired").await?);
        Ok(())
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::default();
        store.set_unavailable(true);
        assert!(store.ping().await.is_err());
        assert!(store.find_user("alice").await.is_err());
        assert!(store.destroy(b"session").await.is_err());
    }
}
