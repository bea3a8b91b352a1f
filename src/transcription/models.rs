//! Data models for transcription.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timed unit of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Transcribed text content.
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text,
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Raw output of transcribing one audio clip.
///
/// Segment times are clip-local (starting near zero); the merge step shifts
/// them into source-global time. Consumed by the merger and then discarded.
#[derive(Debug, Clone, Default)]
pub struct ChunkResult {
    /// Full text of the clip.
    pub text: String,
    /// Timed segments, clip-local, ordered by start time.
    pub segments: Vec<Segment>,
}

/// A complete transcript with source-global timestamps.
///
/// Immutable once produced; the only pipeline artifact that outlives a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Media ID this transcript belongs to.
    pub media_id: String,
    /// Full transcript text.
    pub text: String,
    /// Ordered segments with source-global timestamps.
    pub segments: Vec<Segment>,
    /// Language hint used for transcription.
    pub language: Option<String>,
    /// When the transcript was produced.
    pub processed_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new transcript.
    pub fn new(
        media_id: String,
        text: String,
        segments: Vec<Segment>,
        language: Option<String>,
    ) -> Self {
        Self {
            media_id,
            text,
            segments,
            language,
            processed_at: Utc::now(),
        }
    }

    /// Total duration in seconds (end of the last segment).
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end_seconds).unwrap_or(0.0)
    }

    /// Preview of the transcript text, truncated with an ellipsis.
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let truncated: String = self.text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let segment = Segment::new(1.5, 4.0, "hello".to_string());
        assert_eq!(segment.duration(), 2.5);
    }

    #[test]
    fn test_transcript_duration() {
        let transcript = Transcript::new(
            "test".to_string(),
            "a b".to_string(),
            vec![
                Segment::new(0.0, 5.0, "a".to_string()),
                Segment::new(5.0, 10.0, "b".to_string()),
            ],
            Some("en".to_string()),
        );
        assert_eq!(transcript.duration_seconds(), 10.0);
    }

    #[test]
    fn test_empty_transcript_duration() {
        let transcript = Transcript::new("test".to_string(), String::new(), vec![], None);
        assert_eq!(transcript.duration_seconds(), 0.0);
    }

    #[test]
    fn test_excerpt() {
        let transcript = Transcript::new(
            "test".to_string(),
            "hello world".to_string(),
            vec![],
            None,
        );
        assert_eq!(transcript.excerpt(5), "hello...");
        assert_eq!(transcript.excerpt(100), "hello world");
    }
}
