//! Session history storage for Clipwise.
//!
//! Each session is an append-only log of turns. Turns are never edited or
//! removed, and reads return them in insertion order.

mod memory;
mod sqlite;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use crate::error::{ClipwiseError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Session id used when the caller does not provide one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ClipwiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(ClipwiseError::SessionStore(format!("Unknown role: {}", other))),
        }
    }
}

/// One recorded message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Trait for session store implementations.
///
/// Implementations must be safe to call concurrently for different sessions.
/// For the same session, each append must be atomic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append a turn to a session, creating the session if needed.
    /// The turn is durable once this returns.
    async fn append(&self, session_id: &str, role: Role, content: &str) -> Result<()>;

    /// Get all turns of a session in insertion order. Unknown sessions are empty.
    async fn get(&self, session_id: &str) -> Result<Vec<Turn>>;
}

/// Map an empty or blank session id to [`DEFAULT_SESSION_ID`].
pub fn normalize_session_id(session_id: &str) -> String {
    let trimmed = session_id.trim();
    if trimmed.is_empty() {
        DEFAULT_SESSION_ID.to_string()
    } else {
        session_id.to_string()
    }
}

/// Render a history as `role: content` lines, in store order.
pub fn history_text(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_session_id() {
        assert_eq!(normalize_session_id(""), "default");
        assert_eq!(normalize_session_id("   "), "default");
        assert_eq!(normalize_session_id("s1"), "s1");
    }

    #[test]
    fn test_history_text() {
        let turns = vec![
            Turn::new(Role::User, "Transcribe the video"),
            Turn::new(Role::Assistant, "hello world"),
        ];
        assert_eq!(
            history_text(&turns),
            "user: Transcribe the video\nassistant: hello world"
        );
        assert_eq!(history_text(&[]), "");
    }

    #[test]
    fn test_turn_serializes_role_and_content() {
        let json = serde_json::to_string(&Turn::new(Role::Assistant, "hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("system".parse::<Role>().is_err());
    }
}
