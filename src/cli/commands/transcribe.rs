//! Transcribe command implementation.

use crate::audio_source::{fetch_audio, parse_input, SourceType};
use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::TranscriptionPipeline;
use crate::storage::TranscriptStore;
use crate::transcription::{format_transcript, OutputFormat, WhisperBackend};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Run the transcribe command.
pub async fn run_transcribe(
    input: &str,
    language: Option<String>,
    force: bool,
    output: Option<String>,
    format: &str,
    keep_audio: bool,
    settings: Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    // Parse input to get source and media ID
    let (source, media_id) = parse_input(input)
        .ok_or_else(|| anyhow::anyhow!("Could not parse input: {}", input))?;

    let operation = match source.source_type() {
        SourceType::YouTube => Operation::TranscribeRemote,
        SourceType::Local => Operation::TranscribeLocal,
    };

    // Pre-flight checks
    if let Err(e) = preflight::check(operation) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skrift doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    Output::info(&format!("Processing: {}", input));

    // Fetch metadata
    let metadata = source.fetch_media(&media_id).await?;
    Output::info(&format!("Title: {}", metadata.title));

    let store = TranscriptStore::new(&settings.data_dir())?;

    if store.exists(&metadata.id) && !force && output.is_none() {
        Output::warning(&format!(
            "'{}' is already transcribed. Use --force to reprocess.",
            metadata.title
        ));
        return Ok(());
    }

    // Reject media over the configured duration limit before downloading
    let max_duration = settings.transcription.max_duration_seconds;
    if let Some(duration) = metadata.duration_seconds {
        if max_duration > 0 && duration > max_duration {
            Output::error(&format!(
                "Media is {} long, over the {} limit.",
                format_duration(duration as f64),
                format_duration(max_duration as f64)
            ));
            return Err(anyhow::anyhow!("Media exceeds maximum duration"));
        }
    }

    // Download (or locate) the audio
    let temp_dir = settings.temp_dir();
    std::fs::create_dir_all(&temp_dir)?;

    let cookies_file = settings
        .youtube
        .cookies_file
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()));

    let spinner = Output::spinner("Fetching audio...");
    let audio_path = fetch_audio(&metadata, &temp_dir, force, cookies_file.as_deref()).await?;
    spinner.finish_and_clear();

    // Transcribe
    let language = language.or_else(|| {
        let lang = settings.transcription.language.trim();
        (!lang.is_empty()).then(|| lang.to_string())
    });

    let backend = Arc::new(WhisperBackend::new(&settings.transcription.model)?);
    let pipeline = TranscriptionPipeline::new(backend, &settings.transcription);

    let started = Instant::now();
    Output::info("Transcribing...");

    let result = pipeline.run(&audio_path, &metadata.id, language.as_deref()).await;

    // Downloaded audio is transient unless the user asked to keep it
    if metadata.source_type == SourceType::YouTube && !keep_audio {
        cleanup_audio(&audio_path);
    }

    let transcript = match result {
        Ok(t) => t,
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            return Err(e.into());
        }
    };

    let elapsed = started.elapsed();

    // Either export to a file/stdout or persist to the store
    if let Some(output_path) = output {
        let content = format_transcript(&transcript, output_format);
        if output_path == "-" {
            println!("{}", content);
        } else {
            std::fs::write(&output_path, &content)?;
            Output::success(&format!(
                "Transcript saved to {} ({} segments)",
                output_path,
                transcript.segments.len()
            ));
        }
        return Ok(());
    }

    store.save(&transcript)?;

    Output::success(&format!("Transcribed '{}'", metadata.title));
    Output::kv("Media ID", &transcript.media_id);
    Output::kv("Segments", &transcript.segments.len().to_string());
    Output::kv("Duration", &format_duration(transcript.duration_seconds()));
    Output::kv("Took", &format!("{:.1}s", elapsed.as_secs_f64()));

    let excerpt = transcript.excerpt(500);
    if !excerpt.is_empty() {
        println!();
        println!("{}", excerpt);
    }

    Ok(())
}

fn cleanup_audio(audio_path: &Path) {
    if let Err(e) = std::fs::remove_file(audio_path) {
        tracing::warn!("Failed to cleanup audio file: {}", e);
    }
}
