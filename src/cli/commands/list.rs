//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::storage::TranscriptStore;
use anyhow::Result;

/// Run the list command.
pub fn run_list(settings: Settings) -> Result<()> {
    let store = TranscriptStore::new(&settings.data_dir())?;

    let transcripts = match store.list() {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Failed to list transcripts: {}", e));
            return Err(e.into());
        }
    };

    if transcripts.is_empty() {
        Output::info("No transcripts stored yet. Use 'skrift transcribe <input>' to add content.");
        return Ok(());
    }

    Output::header(&format!("Stored Transcripts ({})", transcripts.len()));
    println!();

    for transcript in &transcripts {
        Output::transcript_info(
            &transcript.excerpt(60),
            &transcript.media_id,
            transcript.segments.len(),
            transcript.duration_seconds(),
        );
    }

    let total_segments: usize = transcripts.iter().map(|t| t.segments.len()).sum();
    println!();
    Output::kv("Total items", &transcripts.len().to_string());
    Output::kv("Total segments", &total_segments.to_string());

    Ok(())
}
