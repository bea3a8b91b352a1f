//! Skrift - Audio Transcription
//!
//! A CLI tool for transcribing audio files and YouTube videos with OpenAI Whisper.
//!
//! The name "Skrift" comes from the Norwegian word for "writing."
//!
//! # Overview
//!
//! Skrift allows you to:
//! - Transcribe local audio/video files and YouTube videos
//! - Split oversized audio into time-bounded chunks and merge the per-chunk
//!   results back into one contiguous, correctly time-shifted transcript
//! - Save transcripts as JSON (with timestamps), plain text, and SRT subtitles
//! - Serve transcription and download endpoints over HTTP
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `audio_source` - Audio source abstraction (YouTube, local files)
//! - `audio` - Audio download, duration probing, and chunking
//! - `transcription` - Speech-to-text backend, transcript model, merge, formats
//! - `pipeline` - The chunked-transcription pipeline
//! - `storage` - Transcript persistence (JSON, TXT, SRT)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use skrift::config::Settings;
//! use skrift::pipeline::TranscriptionPipeline;
//! use skrift::transcription::WhisperBackend;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let backend = Arc::new(WhisperBackend::new(&settings.transcription.model)?);
//!     let pipeline = TranscriptionPipeline::new(backend, &settings.transcription);
//!
//!     let transcript = pipeline
//!         .run(Path::new("talk.mp3"), "talk", Some("en"))
//!         .await?;
//!     println!("{} segments", transcript.segments.len());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod audio_source;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod pipeline;
pub mod storage;
pub mod transcription;

pub use error::{Result, SkriftError};
