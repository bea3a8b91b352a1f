//! The chunked-transcription pipeline.
//!
//! Coordinates the size check, audio splitting, per-chunk transcription,
//! and merge for one audio input. Partial-failure policy lives here: if any
//! chunk fails, the whole run fails and no transcript is produced. A
//! transcript with an undisclosed missing chunk is worse than an explicit
//! failure.

use crate::audio::{split_audio, AudioClip};
use crate::config::TranscriptionSettings;
use crate::error::{Result, SkriftError};
use crate::transcription::{merge_chunks, ChunkResult, Transcript, TranscriptionBackend};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pipeline over a transcription backend.
///
/// Stateless across invocations; each `run` call is independent.
pub struct TranscriptionPipeline {
    backend: Arc<dyn TranscriptionBackend>,
    max_file_size_bytes: u64,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
    retry_attempts: u32,
}

impl TranscriptionPipeline {
    /// Create a pipeline from transcription settings.
    pub fn new(backend: Arc<dyn TranscriptionBackend>, settings: &TranscriptionSettings) -> Self {
        Self {
            backend,
            max_file_size_bytes: settings.max_file_size_bytes(),
            chunk_duration_seconds: settings.chunk_duration_seconds,
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
            retry_attempts: settings.retry_attempts,
        }
    }

    /// Create a pipeline with explicit limits.
    pub fn with_limits(
        backend: Arc<dyn TranscriptionBackend>,
        max_file_size_bytes: u64,
        chunk_duration_seconds: u32,
        max_concurrent_chunks: usize,
        retry_attempts: u32,
    ) -> Self {
        Self {
            backend,
            max_file_size_bytes,
            chunk_duration_seconds,
            max_concurrent_chunks: max_concurrent_chunks.max(1),
            retry_attempts,
        }
    }

    /// Transcribe one audio input into a complete transcript.
    ///
    /// Files at or under the size threshold go straight to the backend in
    /// one call; larger files are partitioned by time, transcribed per
    /// chunk, and merged with accumulated timestamp offsets. The trigger
    /// is byte size, not duration: a long but highly-compressed file may
    /// stay on the direct path, a short high-bitrate file may be split.
    #[instrument(skip(self), fields(audio_path = %audio_path.display(), media_id = %media_id))]
    pub async fn run(
        &self,
        audio_path: &Path,
        media_id: &str,
        language: Option<&str>,
    ) -> Result<Transcript> {
        let byte_size = tokio::fs::metadata(audio_path).await?.len();

        let chunks = if byte_size <= self.max_file_size_bytes {
            debug!("File is {} bytes, transcribing directly", byte_size);
            vec![self.transcribe_with_retry(audio_path, language).await?]
        } else {
            info!(
                "File is {} bytes (over {} limit), splitting into chunks",
                byte_size, self.max_file_size_bytes
            );
            self.transcribe_chunked(audio_path, language).await?
        };

        let (text, segments) = merge_chunks(&chunks);

        Ok(Transcript::new(
            media_id.to_string(),
            text,
            segments,
            language.map(|s| s.to_string()),
        ))
    }

    /// Split the source and transcribe every clip, in chunk order.
    async fn transcribe_chunked(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<Vec<ChunkResult>> {
        let temp_dir = tempfile::tempdir()?;
        let clips = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        info!("Processing {} audio chunks", clips.len());

        let pb = ProgressBar::new(clips.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        let results = self
            .collect_chunk_results(clips, language, Some(&pb))
            .await;

        pb.finish_and_clear();
        drop(temp_dir);

        results
    }

    /// Transcribe clips with bounded concurrency and restore chunk order.
    ///
    /// Chunks are independent units of work; completion order is arbitrary,
    /// so results are re-sorted by clip index before the merge (offset
    /// accumulation is inherently sequential over chunk order). Fails fast:
    /// the first chunk error aborts the run and discards completed results.
    async fn collect_chunk_results(
        &self,
        clips: Vec<AudioClip>,
        language: Option<&str>,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<ChunkResult>> {
        let clip_count = clips.len();
        let mut indexed: Vec<(usize, ChunkResult)> = Vec::with_capacity(clip_count);

        let mut stream = stream::iter(clips.into_iter())
            .map(|clip| {
                let language = language.map(|s| s.to_string());
                async move {
                    let result = self.transcribe_with_retry(&clip.path, language.as_deref()).await;
                    if result.is_ok() {
                        clip.remove_payload();
                    }
                    (clip.index, clip.start_seconds, result)
                }
            })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((index, start_seconds, result)) = stream.next().await {
            if let Some(pb) = progress {
                pb.inc(1);
            }
            match result {
                Ok(chunk) => indexed.push((index, chunk)),
                Err(e) => {
                    return Err(SkriftError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        index, start_seconds, e
                    )));
                }
            }
        }

        indexed.sort_by_key(|(index, _)| *index);

        Ok(indexed.into_iter().map(|(_, chunk)| chunk).collect())
    }

    /// One backend call with the pipeline's bounded retry policy.
    ///
    /// Transient failures (network, API-side) are retried a fixed number of
    /// times with a short backoff; permanent failures (invalid input,
    /// undecodable audio, malformed request) surface immediately.
    async fn transcribe_with_retry(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<ChunkResult> {
        let mut attempt = 0u32;

        loop {
            match self.backend.transcribe(audio_path, language).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.retry_attempts => {
                    attempt += 1;
                    warn!("Transcription attempt {} failed, retrying: {}", attempt, e);
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::Segment;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend returning scripted outcomes per file name.
    struct MockBackend {
        outcomes: Mutex<HashMap<String, VecDeque<Result<ChunkResult>>>>,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                outcomes: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn script(&self, file_name: &str, outcome: Result<ChunkResult>) {
            self.outcomes
                .lock()
                .unwrap()
                .entry(file_name.to_string())
                .or_default()
                .push_back(outcome);
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscriptionBackend for MockBackend {
        async fn transcribe(
            &self,
            audio_path: &Path,
            _language: Option<&str>,
        ) -> Result<ChunkResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let key = audio_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            self.outcomes
                .lock()
                .unwrap()
                .get_mut(&key)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Ok(ChunkResult::default()))
        }
    }

    fn chunk_result(text: &str, segments: &[(f64, f64)]) -> ChunkResult {
        ChunkResult {
            text: text.to_string(),
            segments: segments
                .iter()
                .map(|(s, e)| Segment::new(*s, *e, text.to_string()))
                .collect(),
        }
    }

    fn fake_clip(index: usize, start: f64, name: &str) -> AudioClip {
        AudioClip {
            index,
            start_seconds: start,
            duration_seconds: 600.0,
            path: PathBuf::from(name),
        }
    }

    fn pipeline_with(backend: Arc<MockBackend>, retry_attempts: u32) -> TranscriptionPipeline {
        TranscriptionPipeline::with_limits(backend, 24 * 1024 * 1024, 600, 3, retry_attempts)
    }

    #[tokio::test]
    async fn test_run_small_file_is_direct() {
        let mut file = tempfile::NamedTempFile::with_suffix(".mp3").unwrap();
        file.write_all(b"tiny").unwrap();
        let file_name = file
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();

        let backend = Arc::new(MockBackend::new());
        backend.script(&file_name, Ok(chunk_result("hello there", &[(0.0, 4.0)])));

        let pipeline = pipeline_with(backend.clone(), 0);
        let transcript = pipeline.run(file.path(), "demo", Some("en")).await.unwrap();

        assert_eq!(backend.call_count(), 1);
        assert_eq!(transcript.media_id, "demo");
        assert_eq!(transcript.text, "hello there");
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.segments.len(), 1);
    }

    #[tokio::test]
    async fn test_chunk_results_restored_to_submission_order() {
        let backend = Arc::new(MockBackend::new());
        backend.script("c0.mp3", Ok(chunk_result("first", &[(0.0, 5.0)])));
        backend.script("c1.mp3", Ok(chunk_result("second", &[(0.0, 5.0)])));
        backend.script("c2.mp3", Ok(chunk_result("third", &[(0.0, 5.0)])));

        let pipeline = pipeline_with(backend, 0);
        let clips = vec![
            fake_clip(0, 0.0, "c0.mp3"),
            fake_clip(1, 600.0, "c1.mp3"),
            fake_clip(2, 1200.0, "c2.mp3"),
        ];

        let results = pipeline
            .collect_chunk_results(clips, None, None)
            .await
            .unwrap();

        let texts: Vec<&str> = results.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_any_chunk_failure_fails_the_run() {
        let backend = Arc::new(MockBackend::new());
        backend.script("c0.mp3", Ok(chunk_result("ok", &[(0.0, 5.0)])));
        backend.script(
            "c1.mp3",
            Err(SkriftError::Transcription("backend rejected clip".into())),
        );
        backend.script("c2.mp3", Ok(chunk_result("ok", &[(0.0, 5.0)])));

        let pipeline = pipeline_with(backend, 0);
        let clips = vec![
            fake_clip(0, 0.0, "c0.mp3"),
            fake_clip(1, 600.0, "c1.mp3"),
            fake_clip(2, 1200.0, "c2.mp3"),
        ];

        let err = pipeline
            .collect_chunk_results(clips, None, None)
            .await
            .unwrap_err();

        match err {
            SkriftError::Transcription(msg) => {
                assert!(msg.contains("Chunk 1"));
                assert!(msg.contains("600s"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let backend = Arc::new(MockBackend::new());
        backend.script("c0.mp3", Err(SkriftError::OpenAI("rate limited".into())));
        backend.script("c0.mp3", Err(SkriftError::OpenAI("rate limited".into())));
        backend.script("c0.mp3", Ok(chunk_result("finally", &[(0.0, 2.0)])));

        let pipeline = pipeline_with(backend.clone(), 2);
        let result = pipeline
            .transcribe_with_retry(Path::new("c0.mp3"), None)
            .await
            .unwrap();

        assert_eq!(result.text, "finally");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let backend = Arc::new(MockBackend::new());
        backend.script("c0.mp3", Err(SkriftError::InvalidInput("bad format".into())));

        let pipeline = pipeline_with(backend.clone(), 2);
        let err = pipeline
            .transcribe_with_retry(Path::new("c0.mp3"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SkriftError::InvalidInput(_)));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_merged_transcript_offsets_span_chunks() {
        let backend = Arc::new(MockBackend::new());
        backend.script("c0.mp3", Ok(chunk_result("a", &[(0.0, 5.0), (5.0, 9.0)])));
        backend.script("c1.mp3", Ok(chunk_result("b", &[(0.0, 4.0)])));

        let pipeline = pipeline_with(backend, 0);
        let clips = vec![fake_clip(0, 0.0, "c0.mp3"), fake_clip(1, 600.0, "c1.mp3")];

        let chunks = pipeline
            .collect_chunk_results(clips, None, None)
            .await
            .unwrap();
        let (text, segments) = merge_chunks(&chunks);

        assert_eq!(text, "a b");
        assert_eq!(segments[2].start_seconds, 9.0);
        assert_eq!(segments[2].end_seconds, 13.0);
    }
}
