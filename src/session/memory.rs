//! In-memory session store implementation.
//!
//! History lives for the lifetime of the process. Useful for testing.

use super::{Role, SessionStore, Turn};
use crate::error::{ClipwiseError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory session store.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<Turn>>>,
}

impl MemorySessionStore {
    /// Create a new in-memory session store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn append(&self, session_id: &str, role: Role, content: &str) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| ClipwiseError::SessionStore(format!("Failed to acquire lock: {}", e)))?;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(Turn::new(role, content));
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Vec<Turn>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| ClipwiseError::SessionStore(format!("Failed to acquire lock: {}", e)))?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_store() {
        let store = MemorySessionStore::new();

        tokio_test::block_on(async {
            assert!(store.get("s1").await.unwrap().is_empty());

            store.append("s1", Role::User, "what do you see").await.unwrap();
            store.append("s1", Role::Assistant, "Detected objects: none").await.unwrap();

            let first = store.get("s1").await.unwrap();
            let second = store.get("s1").await.unwrap();
            assert_eq!(first, second);
            assert_eq!(first[0].role, Role::User);
            assert_eq!(first[1].content, "Detected objects: none");
        });
    }
}
