//! Splitting long audio into time-bounded clips.
//!
//! Chunking is triggered upstream by file byte size (the transcription
//! backend's upload limit), but the partition unit here is time: the full
//! duration is divided into contiguous spans of at most the configured
//! chunk length.

use crate::error::{Result, SkriftError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// A contiguous time-bounded span of a source audio file.
///
/// Transient: the file payload is deleted after the clip is transcribed.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Position of this clip in the chunk sequence (0-based).
    pub index: usize,
    /// Start offset within the source, in seconds.
    pub start_seconds: f64,
    /// Clip length in seconds.
    pub duration_seconds: f64,
    /// On-disk location of the extracted clip.
    pub path: PathBuf,
}

impl AudioClip {
    /// Delete the clip's audio payload.
    pub fn remove_payload(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove clip file {:?}: {}", self.path, e);
        }
    }
}

/// Partition a total duration into `ceil(total / max_chunk)` contiguous,
/// non-overlapping `(start, duration)` spans in ascending order.
///
/// The spans exactly cover `[0, total)`: no gaps, no overlaps. The final
/// span may be shorter than `max_chunk` but is never zero-length.
pub fn partition_spans(total_duration: f64, max_chunk_duration: f64) -> Vec<(f64, f64)> {
    if total_duration <= 0.0 || max_chunk_duration <= 0.0 {
        return Vec::new();
    }

    let num_chunks = (total_duration / max_chunk_duration).ceil() as usize;

    (0..num_chunks)
        .map(|i| {
            let start = i as f64 * max_chunk_duration;
            let duration = max_chunk_duration.min(total_duration - start);
            (start, duration)
        })
        .collect()
}

/// Split an audio file into clips of at most `max_chunk_duration` seconds.
///
/// Clip files are written into `output_dir` in ascending span order. The
/// source file is left untouched; callers own cleanup of the clips.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    max_chunk_duration: u32,
) -> Result<Vec<AudioClip>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let spans = partition_spans(total_duration, max_chunk_duration as f64);

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut clips = Vec::with_capacity(spans.len());

    for (index, (start, duration)) in spans.into_iter().enumerate() {
        let clip_path = output_dir.join(format!("{}_{:04}.mp3", base_name, index));

        extract_clip(source, &clip_path, start, duration).await?;

        debug!("Created clip {} at offset {:.1}s", index, start);
        clips.push(AudioClip {
            index,
            start_seconds: start,
            duration_seconds: duration,
            path: clip_path,
        });
    }

    info!("Created {} audio clips", clips.len());
    Ok(clips)
}

/// Extract a time span from an audio file.
async fn extract_clip(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // First attempt: stream copy (fast, no quality loss)
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    // Fallback: re-encode to MP3
    warn!("Stream copy failed, re-encoding clip");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SkriftError::Decode(format!("Clip extraction failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkriftError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SkriftError::Decode(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
///
/// An unparsable payload is a `Decode` error, non-recoverable for that
/// input.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SkriftError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SkriftError::Decode(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SkriftError::Decode("ffprobe could not parse the audio".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| SkriftError::Decode("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SkriftError::Decode("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_exact_coverage() {
        let spans = partition_spans(1500.0, 600.0);

        assert_eq!(spans, vec![(0.0, 600.0), (600.0, 600.0), (1200.0, 300.0)]);

        // Contiguity and total coverage
        let mut expected_start = 0.0;
        let mut total = 0.0;
        for (start, duration) in &spans {
            assert_eq!(*start, expected_start);
            assert!(*duration > 0.0);
            expected_start = start + duration;
            total += duration;
        }
        assert_eq!(total, 1500.0);
    }

    #[test]
    fn test_partition_chunk_count() {
        assert_eq!(partition_spans(1500.0, 600.0).len(), 3);
        assert_eq!(partition_spans(1200.0, 600.0).len(), 2);
        assert_eq!(partition_spans(599.0, 600.0).len(), 1);
        assert_eq!(partition_spans(601.0, 600.0).len(), 2);
    }

    #[test]
    fn test_partition_exact_multiple_has_no_empty_tail() {
        let spans = partition_spans(1200.0, 600.0);
        assert_eq!(spans.last(), Some(&(600.0, 600.0)));
    }

    #[test]
    fn test_partition_short_audio_single_span() {
        assert_eq!(partition_spans(42.5, 600.0), vec![(0.0, 42.5)]);
    }

    #[test]
    fn test_partition_degenerate_inputs() {
        assert!(partition_spans(0.0, 600.0).is_empty());
        assert!(partition_spans(100.0, 0.0).is_empty());
    }
}
