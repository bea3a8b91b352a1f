//! Error types for Skrift.

use thiserror::Error;

/// Library-level error type for Skrift operations.
#[derive(Error, Debug)]
pub enum SkriftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media source error: {0}")]
    VideoSource(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Audio decode failed: {0}")]
    Decode(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Transcript persistence failed: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Media not found: {0}")]
    VideoNotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SkriftError {
    /// Whether the pipeline may retry the failed operation.
    ///
    /// Network and API-side failures are transient; malformed input,
    /// undecodable audio, and configuration problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SkriftError::Http(_) | SkriftError::OpenAI(_) | SkriftError::Io(_)
        )
    }
}

/// Result type alias for Skrift operations.
pub type Result<T> = std::result::Result<T, SkriftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SkriftError::OpenAI("rate limited".into()).is_retryable());
        assert!(!SkriftError::InvalidInput("bad url".into()).is_retryable());
        assert!(!SkriftError::Decode("not audio".into()).is_retryable());
        assert!(!SkriftError::Transcription("empty response".into()).is_retryable());
    }
}
