//! CLI module for Skrift.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Skrift - Audio Transcription
///
/// A CLI tool for transcribing audio files and YouTube videos into
/// timestamped transcripts and subtitles. The name "Skrift" comes from the
/// Norwegian/Scandinavian word for "writing."
#[derive(Parser, Debug)]
#[command(name = "skrift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
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
    /// Initialize Skrift and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Transcribe audio/video content
    Transcribe {
        /// YouTube URL/ID, or local audio/video file path
        input: String,

        /// Language hint for transcription (e.g. "en", "no")
        #[arg(short, long)]
        language: Option<String>,

        /// Force re-processing even if a transcript already exists
        #[arg(short, long)]
        force: bool,

        /// Write the transcript to a file instead of the store ('-' for stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format when using --output (json, txt, srt)
        #[arg(long, default_value = "json")]
        format: String,

        /// Keep the downloaded audio file after transcription
        #[arg(long)]
        keep_audio: bool,
    },

    /// Export a stored transcript
    Export {
        /// Media ID to export
        media_id: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, txt, srt)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// List stored transcripts
    List,

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

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
