//! Merging per-chunk transcription results into one transcript.
//!
//! Chunk results carry clip-local timestamps. Reassembly shifts every
//! segment by an accumulated offset so the merged transcript stays aligned
//! with the original, unsplit audio.

use super::{ChunkResult, Segment};

/// Merge ordered chunk results into full text plus source-global segments.
///
/// Text is the per-chunk texts joined by a single space. Timestamps are
/// shifted by a running offset: after each chunk that produced at least one
/// segment, the offset becomes the shifted end of that chunk's last segment.
/// Using the last segment's end rather than the clip's nominal duration
/// tolerates trailing silence trimmed by the backend. A chunk with zero
/// segments leaves the offset unchanged; the drift this can introduce is
/// bounded by the chunker's fixed-duration partitioning.
///
/// The offset accumulation is inherently sequential over chunk order, so
/// results must arrive here in original chunk order.
pub fn merge_chunks(chunks: &[ChunkResult]) -> (String, Vec<Segment>) {
    let full_text = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut all_segments = Vec::with_capacity(chunks.iter().map(|c| c.segments.len()).sum());
    let mut time_offset = 0.0_f64;

    for chunk in chunks {
        for segment in &chunk.segments {
            all_segments.push(Segment::new(
                segment.start_seconds + time_offset,
                segment.end_seconds + time_offset,
                segment.text.clone(),
            ));
        }

        if !chunk.segments.is_empty() {
            // Shifted end of this chunk's last segment becomes the base
            // offset for the next chunk.
            time_offset = all_segments
                .last()
                .map(|s| s.end_seconds)
                .unwrap_or(time_offset);
        }
    }

    (full_text, all_segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, segments: &[(f64, f64, &str)]) -> ChunkResult {
        ChunkResult {
            text: text.to_string(),
            segments: segments
                .iter()
                .map(|(s, e, t)| Segment::new(*s, *e, t.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_merge_single_chunk_unshifted() {
        let (text, segments) = merge_chunks(&[chunk("hello", &[(0.0, 5.0, "hello")])]);
        assert_eq!(text, "hello");
        assert_eq!(segments, vec![Segment::new(0.0, 5.0, "hello".to_string())]);
    }

    #[test]
    fn test_merge_offset_carry() {
        // Offset carried into chunk B is the end of chunk A's last segment.
        let chunks = [
            chunk("a b", &[(0.0, 5.0, "a"), (5.0, 9.0, "b")]),
            chunk("c", &[(0.0, 4.0, "c")]),
        ];

        let (text, segments) = merge_chunks(&chunks);

        assert_eq!(text, "a b c");
        assert_eq!(
            segments,
            vec![
                Segment::new(0.0, 5.0, "a".to_string()),
                Segment::new(5.0, 9.0, "b".to_string()),
                Segment::new(9.0, 13.0, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_empty_chunk_leaves_offset_unchanged() {
        let chunks = [
            chunk("a", &[(0.0, 6.0, "a")]),
            chunk("", &[]),
            chunk("b", &[(0.0, 3.0, "b")]),
        ];

        let (_, segments) = merge_chunks(&chunks);

        // The empty chunk contributes nothing and the next chunk is still
        // shifted by the offset that preceded it.
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].start_seconds, 6.0);
        assert_eq!(segments[1].end_seconds, 9.0);
    }

    #[test]
    fn test_merge_monotonic_starts() {
        let chunks = [
            chunk("a b", &[(0.2, 3.0, "a"), (3.0, 7.5, "b")]),
            chunk("c d", &[(0.0, 2.0, "c"), (2.5, 6.0, "d")]),
            chunk("e", &[(1.0, 4.0, "e")]),
        ];

        let (_, segments) = merge_chunks(&chunks);

        for pair in segments.windows(2) {
            assert!(pair[0].start_seconds <= pair[1].start_seconds);
        }
    }

    #[test]
    fn test_merge_no_chunks() {
        let (text, segments) = merge_chunks(&[]);
        assert_eq!(text, "");
        assert!(segments.is_empty());
    }
}
