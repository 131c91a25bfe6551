//! Report command implementation.

use super::build_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the report command.
pub async fn run_report(session: &str, format: &str, settings: Settings) -> Result<()> {
    let orchestrator = build_orchestrator(settings)?;

    let spinner = Output::spinner(&format!("Rendering {} report...", format));
    let result = orchestrator.generate_report(session, format).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            Output::success(&format!("Report for session '{}' written", response.session_id));
            Output::kv("Path", &response.path);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate report: {}", e));
            Err(e.into())
        }
    }
}
