//! CLI command implementations.

mod chat;
mod config;
mod doctor;
mod history;
mod query;
mod report;
mod serve;

pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use history::run_history;
pub use query::run_query;
pub use report::run_report;
pub use serve::run_serve;

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;

/// Build the orchestrator, pointing the user at `doctor` if a capability
/// cannot start.
fn build_orchestrator(settings: Settings) -> anyhow::Result<Orchestrator> {
    Orchestrator::new(settings).map_err(|e| {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipwise doctor' for detailed diagnostics.");
        e.into()
    })
}
