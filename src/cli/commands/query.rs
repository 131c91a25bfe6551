//! Query command implementation.

use super::build_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the query command.
pub async fn run_query(
    text: &str,
    video: &str,
    session: &str,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let orchestrator = build_orchestrator(settings)?;

    let spinner = Output::spinner("Working on it...");
    let result = orchestrator.process_query(session, text, video).await;
    spinner.finish_and_clear();

    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            Output::error(&format!("Failed to process query: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        Output::reply(&reply);
    }

    Ok(())
}
