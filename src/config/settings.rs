//! Configuration settings for Skrift.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub youtube: YoutubeSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data (transcripts, subtitles).
    pub data_dir: String,
    /// Directory for temporary files (downloaded audio, chunk files).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.skrift".to_string(),
            temp_dir: "/tmp/skrift".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Default language hint passed to the backend.
    pub language: String,
    /// Duration in seconds of each chunk when splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// File size in megabytes above which audio is split into chunks.
    ///
    /// Mirrors the Whisper upload limit. The trigger is byte size, not
    /// duration; the chunker then partitions by time.
    pub max_file_size_mb: u32,
    /// Maximum concurrent chunk transcriptions.
    pub max_concurrent_chunks: usize,
    /// Extra attempts per backend call after a transient failure.
    pub retry_attempts: u32,
    /// Maximum media duration to process (in seconds).
    pub max_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: "en".to_string(),
            chunk_duration_seconds: 600,
            max_file_size_mb: 24,
            max_concurrent_chunks: 3,
            retry_attempts: 2,
            max_duration_seconds: 14400, // 4 hours
        }
    }
}

impl TranscriptionSettings {
    /// Size threshold in bytes above which audio is chunked.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }
}

/// YouTube-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct YoutubeSettings {
    /// Path to a cookies.txt file for private videos (passed to yt-dlp).
    pub cookies_file: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkriftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skrift")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcription.model, "whisper-1");
        assert_eq!(settings.transcription.chunk_duration_seconds, 600);
        assert_eq!(settings.transcription.max_file_size_mb, 24);
        assert_eq!(
            settings.transcription.max_file_size_bytes(),
            24 * 1024 * 1024
        );
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let settings: Settings =
            toml::from_str("[transcription]\nchunk_duration_seconds = 120\n").unwrap();
        assert_eq!(settings.transcription.chunk_duration_seconds, 120);
        assert_eq!(settings.transcription.model, "whisper-1");
        assert_eq!(settings.server.port, 3000);
    }
}
