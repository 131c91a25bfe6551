//! CLI module for Clipwise.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Clipwise - ask questions about a local video
///
/// Transcribes speech, spots objects and on-screen charts, and turns the
/// conversation into a PDF or PowerPoint summary.
#[derive(Parser, Debug)]
#[command(name = "clipwise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask one question about a video
    Query {
        /// The question, e.g. "Transcribe the video"
        text: String,

        /// Absolute path to a local video file
        #[arg(long, default_value = "")]
        video: String,

        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive session about a video
    Chat {
        /// Absolute path to a local video file
        #[arg(long)]
        video: String,

        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// Generate a report from a session's history
    Report {
        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,

        /// Report format (pdf, pptx)
        #[arg(short, long, default_value = "pdf")]
        format: String,
    },

    /// Print a session's history as JSON
    History {
        /// Session id
        #[arg(short, long, default_value = "default")]
        session: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from([
            "clipwise",
            "-v",
            "query",
            "Transcribe the video",
            "--video",
            "/tmp/clip.mp4",
            "--session",
            "s1",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Query {
                text,
                video,
                session,
                json,
            } => {
                assert_eq!(text, "Transcribe the video");
                assert_eq!(video, "/tmp/clip.mp4");
                assert_eq!(session, "s1");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::parse_from(["clipwise", "report"]);
        match cli.command {
            Commands::Report { session, format } => {
                assert_eq!(session, "default");
                assert_eq!(format, "pdf");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["clipwise", "serve", "--port", "8080"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
