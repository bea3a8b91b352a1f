//! Transcription module for Skrift.
//!
//! Holds the transcript data model, the speech-to-text backend abstraction,
//! the chunk-merge logic, and output formatting (JSON, TXT, SRT).

mod format;
mod merge;
mod models;
mod whisper;

pub use format::{format_srt_timestamp, format_transcript, OutputFormat};
pub use merge::merge_chunks;
pub use models::{ChunkResult, Segment, Transcript};
pub use whisper::WhisperBackend;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for speech-to-text backends.
///
/// A backend transcribes one bounded audio clip into text plus timed
/// segments, with segment times relative to the clip's own start. Swapping
/// vendors means writing a new adapter; the pipeline only sees this trait.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Transcribe a single audio file with an optional language hint.
    ///
    /// Must request segment-level timestamps; if the backend cannot supply
    /// them, the returned [`ChunkResult`] carries an empty segment list.
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<ChunkResult>;
}
