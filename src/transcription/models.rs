//! Data models for transcription.

use serde::{Deserialize, Serialize};

/// A complete transcript with segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Individual transcript segments with timestamps.
    pub segments: Vec<TranscriptSegment>,
    /// Full transcript text, one segment per line.
    pub full_text: String,
    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        let full_text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let duration_seconds = segments
            .last()
            .map(|s| s.end_seconds)
            .unwrap_or(0.0);

        Self {
            segments,
            full_text,
            duration_seconds,
        }
    }
}

/// A single segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
}

impl TranscriptSegment {
    /// Create a new segment.
    pub fn new(start_seconds: f64, end_seconds: f64, text: String) -> Self {
        Self {
            text,
            start_seconds,
            end_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_joins_segments_by_line() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::new(0.0, 1.5, " hello ".to_string()),
            TranscriptSegment::new(1.5, 2.0, "".to_string()),
            TranscriptSegment::new(2.0, 4.0, "world".to_string()),
        ]);
        assert_eq!(transcript.full_text, "hello\nworld");
        assert_eq!(transcript.duration_seconds, 4.0);
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new(Vec::new());
        assert!(transcript.full_text.is_empty());
        assert_eq!(transcript.duration_seconds, 0.0);
    }
}
