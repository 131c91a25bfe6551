//! SQLite-based session store implementation.

use super::{Role, SessionStore, Turn};
use crate::error::{ClipwiseError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS turns (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_turns_session_id ON turns(session_id, id);
"#;

/// SQLite-based session store.
///
/// Every append is a single autocommitted insert, so it is on disk before
/// the call returns. Row ids give the total order of turns.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    /// Open (or create) a session store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL keeps readers from blocking the writer
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite session store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite session store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ClipwiseError::SessionStore(format!("Failed to acquire lock: {}", e)))
    }

    /// List known session ids with their turn counts, most recent first.
    pub fn list_sessions(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT session_id, COUNT(*) AS turn_count, MAX(id) AS last_id
            FROM turns
            GROUP BY session_id
            ORDER BY last_id DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok((row.get::<_, String>(0)?, count as usize))
        })?;

        let sessions = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sessions)
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    #[instrument(skip(self, content))]
    async fn append(&self, session_id: &str, role: Role, content: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO turns (session_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, role.as_str(), content, Utc::now().to_rfc3339()],
        )?;

        debug!("Appended {} turn to session {}", role, session_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, session_id: &str) -> Result<Vec<Turn>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT role, content FROM turns WHERE session_id = ?1 ORDER BY id",
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut turns = Vec::new();
        for row in rows {
            let (role, content) = row?;
            turns.push(Turn {
                role: role.parse()?,
                content,
            });
        }

        debug!("Loaded {} turns for session {}", turns.len(), session_id);
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_session_store() {
        let store = SqliteSessionStore::in_memory().unwrap();

        store.append("s1", Role::User, "Transcribe the video").await.unwrap();
        store.append("s1", Role::Assistant, "hello world").await.unwrap();
        store.append("s2", Role::User, "make a powerpoint").await.unwrap();

        let turns = store.get("s1").await.unwrap();
        assert_eq!(
            turns,
            vec![
                Turn::new(Role::User, "Transcribe the video"),
                Turn::new(Role::Assistant, "hello world"),
            ]
        );

        assert_eq!(store.get("s2").await.unwrap().len(), 1);
        assert!(store.get("missing").await.unwrap().is_empty());

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions[0], ("s2".to_string(), 1));
        assert_eq!(sessions[1], ("s1".to_string(), 2));
    }

    #[tokio::test]
    async fn test_turns_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");

        {
            let store = SqliteSessionStore::new(&path).unwrap();
            store.append("default", Role::User, "first").await.unwrap();
            store.append("default", Role::Assistant, "second").await.unwrap();
        }

        let reopened = SqliteSessionStore::new(&path).unwrap();
        let turns = reopened.get("default").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "first");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_keep_per_session_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(SqliteSessionStore::new(&dir.path().join("history.db")).unwrap());

        let mut handles = Vec::new();
        for session in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let session_id = format!("s{}", session);
                for i in 0..50 {
                    store
                        .append(&session_id, Role::User, &format!("turn {}", i))
                        .await
                        .unwrap();
                    // Reads interleave with the other sessions' writes
                    assert_eq!(store.get(&session_id).await.unwrap().len(), i + 1);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for session in 0..8 {
            let turns = store.get(&format!("s{}", session)).await.unwrap();
            let contents: Vec<String> = turns.into_iter().map(|t| t.content).collect();
            let expected: Vec<String> = (0..50).map(|i| format!("turn {}", i)).collect();
            assert_eq!(contents, expected);
        }

        let sessions = store.list_sessions().unwrap();
        assert_eq!(sessions.len(), 8);
        assert!(sessions.iter().all(|(_, count)| *count == 50));
    }
}
