//! Transcript output formatting (JSON, plain text, SRT).
//!
//! Provides utilities for exporting transcripts in the formats the
//! persistence layer writes and the download surface serves.

use super::Transcript;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Txt,
    Srt,
}

impl OutputFormat {
    /// File extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Txt => "txt",
            OutputFormat::Srt => "srt",
        }
    }

    /// MIME type for the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Txt => "text/plain",
            OutputFormat::Srt => "application/x-subrip",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "txt" | "text" => Ok(OutputFormat::Txt),
            "srt" => Ok(OutputFormat::Srt),
            _ => Err(format!("Unknown format: {}. Use json, txt, or srt.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Format a transcript for output.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(transcript).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Txt => transcript.text.clone(),
        OutputFormat::Srt => format_srt(transcript),
    }
}

/// Format as SRT (SubRip).
///
/// One cue per segment: 1-based index line, timestamp line, trimmed text,
/// blank separator. A transcript with zero segments renders as empty
/// output, which is valid SRT.
fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));

        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(segment.end_seconds)
        ));

        output.push_str(segment.text.trim());
        output.push_str("\n\n");
    }

    output
}

/// Format a second offset as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Milliseconds are truncated, never rounded: a fractional part of 999.6 ms
/// renders as 999 and never rolls the seconds field. This keeps cue starts
/// from landing after the audio they subtitle, at the cost of being up to
/// one millisecond early.
pub fn format_srt_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = seconds % 60.0;
    let millis = ((secs - secs.floor()) * 1000.0) as u64;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs as u64, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::Segment;

    fn sample_transcript() -> Transcript {
        Transcript::new(
            "test123".to_string(),
            "Hello world. This is a test.".to_string(),
            vec![
                Segment::new(0.0, 2.5, "Hello world.".to_string()),
                Segment::new(2.5, 5.0, " This is a test. ".to_string()),
            ],
            Some("en".to_string()),
        )
    }

    #[test]
    fn test_format_json() {
        let json = format_transcript(&sample_transcript(), OutputFormat::Json);
        assert!(json.contains("\"media_id\": \"test123\""));
        assert!(json.contains("Hello world."));
        assert!(json.contains("\"language\": \"en\""));
        assert!(json.contains("processed_at"));
    }

    #[test]
    fn test_format_txt() {
        let txt = format_transcript(&sample_transcript(), OutputFormat::Txt);
        assert_eq!(txt, "Hello world. This is a test.");
    }

    #[test]
    fn test_format_srt_structure() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt);

        let blocks: Vec<&str> = srt.trim_end().split("\n\n").collect();
        assert_eq!(blocks.len(), 2);

        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));
        // Segment text is trimmed of surrounding whitespace.
        assert!(srt.contains("\nThis is a test.\n"));
    }

    #[test]
    fn test_format_srt_empty() {
        let transcript = Transcript::new("empty".to_string(), String::new(), vec![], None);
        assert_eq!(format_transcript(&transcript, OutputFormat::Srt), "");
    }

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3725.4), "01:02:05,400");
    }

    #[test]
    fn test_srt_timestamp_truncates_millis() {
        // 999.6ms truncates to 999 and never rolls into the next second.
        assert_eq!(format_srt_timestamp(59.9996), "00:00:59,999");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!("SRT".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert!("vtt".parse::<OutputFormat>().is_err());
    }
}
