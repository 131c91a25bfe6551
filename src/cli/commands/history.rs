//! History command implementation.

use crate::cli::Output;
use crate::config::{SessionStoreProvider, Settings};
use crate::orchestrator::HistoryResponse;
use crate::session::{normalize_session_id, SessionStore, SqliteSessionStore};
use anyhow::Result;

/// Run the history command.
///
/// Reads the session store directly, so no API key is needed.
pub async fn run_history(session: &str, settings: Settings) -> Result<()> {
    let session_id = normalize_session_id(session);
    let db_path = settings.sqlite_path();

    let turns = match settings.session_store.provider {
        SessionStoreProvider::Sqlite if db_path.exists() => {
            SqliteSessionStore::new(&db_path)?.get(&session_id).await?
        }
        SessionStoreProvider::Sqlite => Vec::new(),
        SessionStoreProvider::Memory => {
            Output::warning("The memory session store does not outlive the server process.");
            Vec::new()
        }
    };

    let response = HistoryResponse {
        session_id,
        history_json: serde_json::to_string(&turns)?,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
