//! Transcript persistence.
//!
//! Each transcription run persists three renditions keyed by media ID:
//! the full transcript as JSON, the plain text, and SRT subtitles. JSON is
//! the source of truth; the text and subtitle files are derived and can be
//! regenerated from it. Saving the same ID again overwrites all three.
//!
//! Layout under the data directory:
//!
//! ```text
//! transcripts/<id>.json
//! transcripts/<id>.txt
//! subtitles/<id>.srt
//! ```

use crate::error::{Result, SkriftError};
use crate::transcription::{format_transcript, OutputFormat, Transcript};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Filesystem-backed transcript store.
pub struct TranscriptStore {
    transcripts_dir: PathBuf,
    subtitles_dir: PathBuf,
}

impl TranscriptStore {
    /// Open a store rooted at the given data directory, creating the
    /// layout if needed.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let transcripts_dir = data_dir.join("transcripts");
        let subtitles_dir = data_dir.join("subtitles");

        std::fs::create_dir_all(&transcripts_dir).map_err(|e| {
            SkriftError::Persistence(format!(
                "Cannot create {}: {}",
                transcripts_dir.display(),
                e
            ))
        })?;
        std::fs::create_dir_all(&subtitles_dir).map_err(|e| {
            SkriftError::Persistence(format!("Cannot create {}: {}", subtitles_dir.display(), e))
        })?;

        Ok(Self {
            transcripts_dir,
            subtitles_dir,
        })
    }

    /// Persist all three renditions of a transcript.
    #[instrument(skip(self, transcript), fields(media_id = %transcript.media_id))]
    pub fn save(&self, transcript: &Transcript) -> Result<()> {
        for format in [OutputFormat::Json, OutputFormat::Txt, OutputFormat::Srt] {
            let content = format_transcript(transcript, format);
            let path = self.path_for(&transcript.media_id, format);
            std::fs::write(&path, content).map_err(|e| {
                SkriftError::Persistence(format!("Cannot write {}: {}", path.display(), e))
            })?;
            debug!("Wrote {}", path.display());
        }

        Ok(())
    }

    /// Path where the given rendition of a media ID lives (or would live).
    pub fn path_for(&self, media_id: &str, format: OutputFormat) -> PathBuf {
        let dir = match format {
            OutputFormat::Srt => &self.subtitles_dir,
            _ => &self.transcripts_dir,
        };
        dir.join(format!("{}.{}", media_id, format.extension()))
    }

    /// Whether a transcript exists for the given media ID.
    pub fn exists(&self, media_id: &str) -> bool {
        self.path_for(media_id, OutputFormat::Json).exists()
    }

    /// Load the stored transcript for a media ID.
    pub fn load(&self, media_id: &str) -> Result<Transcript> {
        let path = self.path_for(media_id, OutputFormat::Json);

        if !path.exists() {
            return Err(SkriftError::Persistence(format!(
                "No transcript found for '{}'",
                media_id
            )));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            SkriftError::Persistence(format!("Cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            SkriftError::Persistence(format!("Corrupt transcript {}: {}", path.display(), e))
        })
    }

    /// List all stored transcripts, newest first.
    pub fn list(&self) -> Result<Vec<Transcript>> {
        let mut transcripts = Vec::new();

        let entries = std::fs::read_dir(&self.transcripts_dir).map_err(|e| {
            SkriftError::Persistence(format!(
                "Cannot read {}: {}",
                self.transcripts_dir.display(),
                e
            ))
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(media_id) = path.file_stem().and_then(|s| s.to_str()) {
                match self.load(media_id) {
                    Ok(t) => transcripts.push(t),
                    Err(e) => debug!("Skipping unreadable transcript {}: {}", media_id, e),
                }
            }
        }

        transcripts.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));

        Ok(transcripts)
    }

    /// Remove all renditions for a media ID. Missing files are not an error.
    pub fn remove(&self, media_id: &str) -> Result<()> {
        for format in [OutputFormat::Json, OutputFormat::Txt, OutputFormat::Srt] {
            let path = self.path_for(media_id, format);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    SkriftError::Persistence(format!("Cannot remove {}: {}", path.display(), e))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::Segment;

    fn sample_transcript(media_id: &str) -> Transcript {
        Transcript::new(
            media_id.to_string(),
            "Hello world.".to_string(),
            vec![Segment::new(0.0, 2.5, "Hello world.".to_string())],
            Some("en".to_string()),
        )
    }

    #[test]
    fn test_save_writes_all_renditions() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        store.save(&sample_transcript("vid1")).unwrap();

        assert!(dir.path().join("transcripts/vid1.json").exists());
        assert!(dir.path().join("transcripts/vid1.txt").exists());
        assert!(dir.path().join("subtitles/vid1.srt").exists());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        let original = sample_transcript("vid2");
        store.save(&original).unwrap();

        let loaded = store.load("vid2").unwrap();
        assert_eq!(loaded.media_id, "vid2");
        assert_eq!(loaded.text, original.text);
        assert_eq!(loaded.segments.len(), 1);
        assert_eq!(loaded.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_load_missing_id_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        let err = store.load("nope").unwrap_err();
        assert!(matches!(err, SkriftError::Persistence(_)));
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        store.save(&sample_transcript("vid3")).unwrap();

        let mut updated = sample_transcript("vid3");
        updated.text = "Replaced.".to_string();
        store.save(&updated).unwrap();

        assert_eq!(store.load("vid3").unwrap().text, "Replaced.");
    }

    #[test]
    fn test_list_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        assert!(!store.exists("a"));
        store.save(&sample_transcript("a")).unwrap();
        store.save(&sample_transcript("b")).unwrap();

        assert!(store.exists("a"));
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_remove_deletes_all_renditions() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path()).unwrap();

        store.save(&sample_transcript("gone")).unwrap();
        store.remove("gone").unwrap();

        assert!(!store.exists("gone"));
        assert!(!dir.path().join("subtitles/gone.srt").exists());
    }
}
