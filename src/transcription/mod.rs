//! Transcription module for Clipwise.
//!
//! Turns the speech in a video into text and an SRT subtitle file using
//! OpenAI Whisper.

mod models;
mod subtitles;
mod whisper;

pub use models::{Transcript, TranscriptSegment};
pub use subtitles::{format_srt, write_srt};
pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// What a transcription run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    /// Full transcript text.
    pub transcript: String,
    /// Subtitle file written for the video, if any.
    pub subtitle_path: Option<PathBuf>,
}

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the speech in a video file.
    async fn transcribe(&self, video_path: &Path) -> Result<Transcription>;
}
