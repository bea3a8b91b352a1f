//! Export command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::storage::TranscriptStore;
use crate::transcription::{format_transcript, OutputFormat};
use anyhow::Result;

/// Run the export command.
pub fn run_export(
    media_id: &str,
    output: Option<String>,
    format: &str,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let store = TranscriptStore::new(&settings.data_dir())?;

    let transcript = match store.load(media_id) {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Use 'skrift list' to see stored transcripts.");
            return Err(e.into());
        }
    };

    let content = format_transcript(&transcript, output_format);

    match output {
        Some(path) if path != "-" => {
            std::fs::write(&path, &content)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} segments)",
                media_id,
                path,
                transcript.segments.len()
            ));
        }
        _ => {
            println!("{}", content);
        }
    }

    Ok(())
}
