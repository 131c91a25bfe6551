//! OpenAI Whisper transcription implementation.

use super::{write_srt, Transcriber, Transcript, TranscriptSegment, Transcription};
use crate::config::Settings;
use crate::error::{ClipwiseError, Result};
use crate::media::{extract_audio, split_audio};
use crate::openai::create_client;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
    chunk_duration_seconds: u32,
    max_concurrent_chunks: usize,
    write_subtitles: bool,
    temp_dir: PathBuf,
}

impl WhisperTranscriber {
    /// Create a transcriber from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            client: create_client()?,
            model: settings.transcription.model.clone(),
            language: settings.transcription.language.clone(),
            chunk_duration_seconds: settings.transcription.chunk_duration_seconds.max(1),
            max_concurrent_chunks: settings.transcription.max_concurrent_chunks.max(1),
            write_subtitles: settings.transcription.write_subtitles,
            temp_dir,
        })
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::VerboseJson);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build()
            .map_err(|e| ClipwiseError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self.client.audio().transcribe_verbose_json(request).await
            .map_err(|e| ClipwiseError::OpenAI(format!("Whisper API error: {}", e)))?;

        let segments: Vec<TranscriptSegment> = response.segments
            .map(|segs| {
                segs.iter()
                    .map(|s| TranscriptSegment::new(
                        s.start as f64,
                        s.end as f64,
                        s.text.trim().to_string(),
                    ))
                    .collect()
            })
            .unwrap_or_else(|| {
                // No segment list: the whole text becomes one segment
                vec![TranscriptSegment::new(
                    0.0,
                    response.duration as f64,
                    response.text.trim().to_string(),
                )]
            });

        debug!("Transcribed {} segments", segments.len());
        Ok(segments)
    }

    /// Transcribe an audio file, splitting it when it is longer than one chunk.
    #[instrument(skip(self, work_dir), fields(audio_path = %audio_path.display()))]
    async fn transcribe_audio(&self, audio_path: &Path, work_dir: &Path) -> Result<Transcript> {
        let chunks = split_audio(audio_path, &work_dir.join("chunks"), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            let segments = self.transcribe_single(audio_path).await?;
            return Ok(Transcript::new(segments));
        }

        info!("Processing {} audio chunks with {}", chunks.len(), self.model);

        let mut results: Vec<(usize, f64, Vec<TranscriptSegment>)> = Vec::with_capacity(chunks.len());

        let mut stream = stream::iter(chunks.into_iter().enumerate())
            .map(|(idx, (chunk_path, time_offset))| async move {
                let result = self.transcribe_single(&chunk_path).await;
                (idx, time_offset, result)
            })
            .buffer_unordered(self.max_concurrent_chunks);

        // Fail fast: the first failed chunk fails the whole transcription
        while let Some((idx, time_offset, result)) = stream.next().await {
            match result {
                Ok(segments) => results.push((idx, time_offset, segments)),
                Err(e) => {
                    return Err(ClipwiseError::Transcription(format!(
                        "Chunk {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            }
        }

        results.sort_by_key(|(idx, _, _)| *idx);

        let mut all_segments = Vec::new();
        for (_, time_offset, mut segments) in results {
            for segment in &mut segments {
                segment.start_seconds += time_offset;
                segment.end_seconds += time_offset;
            }
            all_segments.extend(segments);
        }

        Ok(Transcript::new(all_segments))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self), fields(video = %video_path.display()))]
    async fn transcribe(&self, video_path: &Path) -> Result<Transcription> {
        let work_dir = tempfile::Builder::new()
            .prefix("transcribe-")
            .tempdir_in(&self.temp_dir)?;

        let audio_path = extract_audio(video_path, work_dir.path()).await?;
        let transcript = self.transcribe_audio(&audio_path, work_dir.path()).await?;

        info!(
            "Transcription complete ({} segments, {:.0}s)",
            transcript.segments.len(),
            transcript.duration_seconds
        );

        let subtitle_path = if self.write_subtitles {
            Some(write_srt(&transcript, video_path)?)
        } else {
            None
        };

        Ok(Transcription {
            transcript: transcript.full_text,
            subtitle_path,
        })
    }
}
