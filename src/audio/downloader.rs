//! Audio download utilities.
//!
//! This module provides functions for downloading audio from URLs using
//! yt-dlp and normalizing the result to MP3 using ffmpeg.

use crate::error::{Result, SkriftError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Downloads audio from a URL and saves it as MP3.
///
/// Uses yt-dlp to download and extract audio. If the file already exists it
/// is reused, unless `force` is set. A cookies.txt file can be supplied for
/// private videos.
#[instrument(skip(output_dir, cookies_file), fields(video_id = %video_id))]
pub async fn download_audio(
    url: &str,
    video_id: &str,
    output_dir: &Path,
    force: bool,
    cookies_file: Option<&Path>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", video_id));

    if target_path.exists() && !force {
        info!("Using cached audio file");
        return Ok(target_path);
    }

    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    let mut command = Command::new("yt-dlp");
    command
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--audio-quality").arg("0")
        .arg("--output").arg(template.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings");

    if force {
        command.arg("--force-overwrites");
    }

    if let Some(cookies) = cookies_file {
        command.arg("--cookies").arg(cookies);
    }

    let result = command
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SkriftError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(SkriftError::AudioDownload(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SkriftError::AudioDownload(format!("yt-dlp failed: {stderr}")));
    }

    // yt-dlp may output different formats; find and normalize to mp3
    let downloaded = find_audio_file(output_dir, video_id)?;

    if downloaded != target_path {
        normalize_to_mp3(&downloaded, &target_path).await?;
        let _ = std::fs::remove_file(&downloaded);
    }

    Ok(target_path)
}

/// Locates a downloaded audio file by video ID.
fn find_audio_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    // Common audio formats that yt-dlp may produce
    for ext in &["mp3", "opus", "m4a", "webm", "ogg"] {
        let candidate = dir.join(format!("{}.{}", video_id, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback: scan directory for matching prefix
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SkriftError::AudioDownload(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(video_id) {
            return Ok(entry.path());
        }
    }

    Err(SkriftError::AudioDownload("Audio file not found after download".into()))
}

/// Converts an audio file to MP3 using ffmpeg.
async fn normalize_to_mp3(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to MP3", source);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SkriftError::AudioDownload(format!("ffmpeg conversion failed: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SkriftError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(SkriftError::AudioDownload(format!("ffmpeg error: {e}"))),
    }
}
