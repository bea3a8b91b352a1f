//! Audio acquisition and chunking.
//!
//! Downloading/normalizing audio via yt-dlp and ffmpeg, probing duration
//! via ffprobe, and splitting oversized files into time-bounded clips.

mod chunker;
mod downloader;

pub use chunker::{partition_spans, probe_duration, split_audio, AudioClip};
pub use downloader::download_audio;
