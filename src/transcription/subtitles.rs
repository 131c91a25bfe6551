//! SRT subtitle rendering.

use super::Transcript;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Format a transcript as SRT (SubRip).
pub fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        // Cue numbers are 1-based
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

/// Write the SRT for `transcript` next to `video_path` and return its path.
pub fn write_srt(transcript: &Transcript, video_path: &Path) -> Result<PathBuf> {
    let srt_path = video_path.with_extension("srt");
    std::fs::write(&srt_path, format_srt(transcript))?;
    Ok(srt_path)
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0) as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}
