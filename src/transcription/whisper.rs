//! OpenAI Whisper transcription backend.

use super::{ChunkResult, Segment, TranscriptionBackend};
use crate::error::{Result, SkriftError};
use crate::openai::create_client;
use async_openai::types::{
    AudioResponseFormat, CreateTranscriptionRequestArgs, TimestampGranularity,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// OpenAI Whisper-based transcription backend.
pub struct WhisperBackend {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl WhisperBackend {
    /// Create a new Whisper backend for the given model.
    pub fn new(model: &str) -> Result<Self> {
        let client = create_client();

        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TranscriptionBackend for WhisperBackend {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<ChunkResult> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson)
            .timestamp_granularities(vec![TimestampGranularity::Segment]);

        if let Some(lang) = language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| SkriftError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| SkriftError::OpenAI(format!("Whisper API error: {}", e)))?;

        // Segment timestamps drive the merge step. If the backend omits
        // them, downstream code tolerates an empty list: SRT output yields
        // zero cues, text output is unaffected.
        let segments: Vec<Segment> = match response.segments {
            Some(segs) => segs
                .iter()
                .map(|s| Segment::new(s.start as f64, s.end as f64, s.text.trim().to_string()))
                .collect(),
            None => {
                warn!("Backend returned no segment timestamps");
                Vec::new()
            }
        };

        debug!("Transcribed {} segments", segments.len());

        Ok(ChunkResult {
            text: response.text.trim().to_string(),
            segments,
        })
    }
}
