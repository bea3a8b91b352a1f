//! Skrift CLI entry point.

use anyhow::Result;
use clap::Parser;
use skrift::cli::{commands, Cli, Commands};
use skrift::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skrift={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Transcribe {
            input,
            language,
            force,
            output,
            format,
            keep_audio,
        } => {
            commands::run_transcribe(
                input,
                language.clone(),
                *force,
                output.clone(),
                format,
                *keep_audio,
                settings,
            )
            .await?;
        }

        Commands::Export {
            media_id,
            output,
            format,
        } => {
            commands::run_export(media_id, output.clone(), format, settings)?;
        }

        Commands::List => {
            commands::run_list(settings)?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.as_deref(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
