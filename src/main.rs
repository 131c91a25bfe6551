//! Clipwise CLI entry point.

use anyhow::Result;
use clap::Parser;
use clipwise::cli::{commands, Cli, Commands};
use clipwise::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("clipwise={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.output_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Query {
            text,
            video,
            session,
            json,
        } => {
            commands::run_query(text, video, session, *json, settings).await?;
        }

        Commands::Chat { video, session } => {
            commands::run_chat(video, session, settings).await?;
        }

        Commands::Report { session, format } => {
            commands::run_report(session, format, settings).await?;
        }

        Commands::History { session } => {
            commands::run_history(session, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(config_path, &settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
