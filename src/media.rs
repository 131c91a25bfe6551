//! Media processing utilities.
//!
//! Thin wrappers over ffmpeg and ffprobe: pulling the audio track out of a
//! video, splitting long audio, probing duration, and sampling still frames.

use crate::error::{ClipwiseError, Result};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Run a prepared command, mapping spawn failures to tool errors.
async fn run_tool(tool: &str, command: &mut Command) -> Result<Output> {
    match command.output().await {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ClipwiseError::ToolNotFound(tool.to_string()))
        }
        Err(e) => Err(ClipwiseError::ToolFailed(format!("{} execution failed: {}", tool, e))),
    }
}

/// Extracts the audio track of a video as MP3 into `output_dir`.
#[instrument(skip(output_dir), fields(video = %video.display()))]
pub async fn extract_audio(video: &Path, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let stem = video
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    let target = output_dir.join(format!("{}.mp3", stem));

    info!("Extracting audio track");

    let output = run_tool(
        "ffmpeg",
        Command::new("ffmpeg")
            .arg("-i").arg(video)
            .arg("-vn")
            .arg("-codec:a").arg("libmp3lame")
            .arg("-qscale:a").arg("2")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(&target)
            .stdout(Stdio::null())
            .stderr(Stdio::piped()),
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipwiseError::ToolFailed(format!("ffmpeg audio extraction failed: {stderr}")));
    }

    Ok(target)
}

/// Segments a long audio file into smaller chunks for processing.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns tuples of
/// (chunk_path, offset_seconds) for each segment.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    // Short audio doesn't need splitting
    let windows = chunk_windows(total_duration, chunk_seconds);
    if windows.len() <= 1 {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();
    for (idx, (offset, segment_len)) in windows.into_iter().enumerate() {
        let segment_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Offsets and lengths of the chunks covering `total_duration` seconds.
///
/// A chunk length of zero is treated as one second.
fn chunk_windows(total_duration: f64, chunk_seconds: u32) -> Vec<(f64, f64)> {
    let chunk_len = chunk_seconds.max(1) as f64;

    let mut windows = Vec::new();
    let mut offset = 0.0;
    while offset < total_duration {
        windows.push((offset, chunk_len.min(total_duration - offset)));
        offset += chunk_len;
    }
    windows
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // Stream copy first; it is lossless and fast
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    warn!("Stream copy failed, re-encoding segment");

    let output = run_tool(
        "ffmpeg",
        Command::new("ffmpeg")
            .arg("-ss").arg(format!("{:.3}", start))
            .arg("-i").arg(source)
            .arg("-t").arg(format!("{:.3}", length))
            .arg("-codec:a").arg("libmp3lame")
            .arg("-qscale:a").arg("2")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(dest)
            .stdout(Stdio::null())
            .stderr(Stdio::piped()),
    )
    .await?;

    if output.status.success() {
        Ok(())
    } else {
        let err = String::from_utf8_lossy(&output.stderr);
        Err(ClipwiseError::ToolFailed(format!("Segment extraction failed: {err}")))
    }
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = run_tool(
        "ffprobe",
        Command::new("ffprobe")
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg(path),
    )
    .await?;

    if !output.status.success() {
        return Err(ClipwiseError::ToolFailed("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_probe_duration(&json_str)
}

/// Pull `format.duration` out of ffprobe's JSON report.
fn parse_probe_duration(json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| ClipwiseError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| ClipwiseError::ToolFailed("Could not determine media duration".into()))
}

/// Samples still frames from a video as JPEG files.
///
/// Frames are taken at `fps` frames per second of video, at most
/// `max_frames` of them. Returns frame paths in playback order.
#[instrument(skip(output_dir), fields(video = %video.display()))]
pub async fn sample_frames(
    video: &Path,
    output_dir: &Path,
    fps: f64,
    max_frames: usize,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let pattern = output_dir.join("frame_%05d.jpg");

    let output = run_tool(
        "ffmpeg",
        Command::new("ffmpeg")
            .arg("-i").arg(video)
            .arg("-vf").arg(format!("fps={}", fps))
            .arg("-frames:v").arg(max_frames.to_string())
            .arg("-q:v").arg("4")
            .arg("-y")
            .arg("-loglevel").arg("error")
            .arg(&pattern)
            .stdout(Stdio::null())
            .stderr(Stdio::piped()),
    )
    .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipwiseError::ToolFailed(format!("ffmpeg frame sampling failed: {stderr}")));
    }

    let frames = collect_frames(output_dir)?;
    info!("Sampled {} frames", frames.len());
    Ok(frames)
}

/// Sorted list of `frame_*.jpg` files in a directory.
fn collect_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".jpg"))
        })
        .collect();
    frames.sort();
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "a.mp3", "duration": "61.500000"}}"#;
        assert!((parse_probe_duration(json).unwrap() - 61.5).abs() < 1e-9);
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("not json").is_err());
    }

    #[test]
    fn test_collect_frames_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_00002.jpg", "frame_00001.jpg", "notes.txt", "frame_00003.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let frames = collect_frames(dir.path()).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["frame_00001.jpg", "frame_00002.jpg"]);
    }

    #[test]
    fn test_chunk_windows() {
        assert_eq!(chunk_windows(25.0, 10), vec![(0.0, 10.0), (10.0, 10.0), (20.0, 5.0)]);
        assert_eq!(chunk_windows(8.0, 10), vec![(0.0, 8.0)]);
        assert!(chunk_windows(0.0, 10).is_empty());
    }

    #[test]
    fn test_zero_chunk_length_still_terminates() {
        let windows = chunk_windows(2.5, 0);
        assert_eq!(windows, vec![(0.0, 1.0), (1.0, 1.0), (2.0, 0.5)]);
    }
}
