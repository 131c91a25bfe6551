//! CLI output formatting utilities.

use crate::orchestrator::Reply;
use crate::session::{Role, Turn};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a reply to a query.
    pub fn reply(reply: &Reply) {
        if reply.needs_clarification {
            println!("\n{} {}\n", style("?").yellow().bold(), reply.clarification_prompt);
            return;
        }

        if reply.answer.is_empty() {
            println!("\n{}\n", style("(nothing to report)").dim());
        } else {
            println!("\n{}\n", reply.answer);
        }

        for artifact in &reply.artifacts {
            Output::list_item(artifact);
        }
    }

    /// Print one turn of a session.
    pub fn turn(turn: &Turn) {
        let role = match turn.role {
            Role::User => style("user").green().bold(),
            Role::Assistant => style("assistant").cyan().bold(),
        };
        println!("{} {}", role, content_preview(&turn.content, 200));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Single-line preview, cut at `max_chars` characters.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content,
    }
}
