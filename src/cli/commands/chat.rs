//! Interactive chat about one video.

use super::build_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(video: &str, session: &str, settings: Settings) -> Result<()> {
    let orchestrator = build_orchestrator(settings)?;

    println!("\n{}", style("Clipwise Chat").bold().cyan());
    println!("{}", style(format!("Video: {}  Session: {}", video, session)).dim());
    println!(
        "{}\n",
        style("Ask about the video, 'history' to show the session, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("history") {
            match orchestrator.get_history(session).await {
                Ok(turns) if turns.is_empty() => Output::info("No history yet."),
                Ok(turns) => turns.iter().for_each(Output::turn),
                Err(e) => Output::error(&format!("Error: {}", e)),
            }
            continue;
        }

        let spinner = Output::spinner("Working on it...");
        let result = orchestrator.process_query(session, input, video).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => Output::reply(&reply),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
