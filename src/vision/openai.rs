//! Vision-model backed object detection.
//!
//! Frames are sampled with ffmpeg and each one is sent to an OpenAI
//! vision-capable chat model, which lists every object instance it sees.

use super::{Detection, VisionDetector};
use crate::config::Settings;
use crate::error::{ClipwiseError, Result};
use crate::media::sample_frames;
use crate::openai::{api_key, base_url, http_client};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Instructions sent with every frame.
const DETECTION_PROMPT: &str = r#"You are an object detector. List every distinct object instance visible in the image using short, lowercase COCO-style labels (for example "person", "laptop", "tv", "cell phone", "chair", "cup"). Repeat a label once per instance. Respond with JSON only: {"objects": ["label", ...]}"#;

/// Object detector backed by an OpenAI vision model.
pub struct OpenAiVisionDetector {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    sample_fps: f64,
    max_frames: usize,
    max_concurrent_frames: usize,
    screen_labels: Vec<String>,
    temp_dir: PathBuf,
}

/// Labels returned for one frame.
#[derive(Debug, Deserialize)]
struct FrameLabels {
    #[serde(default)]
    objects: Vec<String>,
}

impl OpenAiVisionDetector {
    /// Create a detector from settings. Requires `OPENAI_API_KEY`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            http: http_client()?,
            endpoint: format!("{}/chat/completions", base_url()),
            api_key: api_key()?,
            model: settings.vision.model.clone(),
            sample_fps: settings.vision.sample_fps,
            max_frames: settings.vision.max_frames.max(1),
            max_concurrent_frames: settings.vision.max_concurrent_frames.max(1),
            screen_labels: settings.vision.screen_labels.clone(),
            temp_dir,
        })
    }

    /// Ask the model for the objects in one frame.
    #[instrument(skip(self), fields(frame = %frame.display()))]
    async fn label_frame(&self, frame: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(frame).await?;
        let data_url = format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes));

        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": DETECTION_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": "List the objects in this frame." },
                        { "type": "image_url", "image_url": { "url": data_url, "detail": "low" } }
                    ]
                }
            ]
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClipwiseError::OpenAI(format!("Vision API error ({}): {}", status, text)));
        }

        let payload: serde_json::Value = response.json().await?;
        let labels = parse_labels(&payload)?;
        debug!("Frame has {} objects", labels.len());
        Ok(labels)
    }
}

/// Extract the label list from a chat completion payload.
fn parse_labels(payload: &serde_json::Value) -> Result<Vec<String>> {
    let content = payload["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| ClipwiseError::Vision("Response has no message content".to_string()))?;

    let labels: FrameLabels = serde_json::from_str(content.trim())
        .map_err(|e| ClipwiseError::Vision(format!("Unexpected detector output: {}", e)))?;

    Ok(labels.objects)
}

#[async_trait]
impl VisionDetector for OpenAiVisionDetector {
    #[instrument(skip(self), fields(video = %video_path.display()))]
    async fn detect(&self, video_path: &Path) -> Result<Detection> {
        let work_dir = tempfile::Builder::new()
            .prefix("frames-")
            .tempdir_in(&self.temp_dir)?;

        let frames = sample_frames(video_path, work_dir.path(), self.sample_fps, self.max_frames).await?;
        if frames.is_empty() {
            warn!("No frames could be sampled");
            return Ok(Detection::default());
        }

        let results: Vec<Result<Vec<String>>> = stream::iter(frames.clone())
            .map(|frame| async move { self.label_frame(&frame).await })
            .buffer_unordered(self.max_concurrent_frames)
            .collect()
            .await;

        let mut labels = Vec::new();
        for result in results {
            labels.extend(result?);
        }

        let detection = Detection::from_labels(labels, &self.screen_labels);
        info!(
            "Detected {} object kinds in {} frames (graphs: {})",
            detection.objects.len(),
            frames.len(),
            detection.graphs_detected
        );
        Ok(detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(temp_dir: PathBuf) -> OpenAiVisionDetector {
        OpenAiVisionDetector {
            http: reqwest::Client::new(),
            endpoint: "http://127.0.0.1:9/chat/completions".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            sample_fps: 2.0,
            max_frames: 4,
            max_concurrent_frames: 2,
            screen_labels: vec!["tv".to_string()],
            temp_dir,
        }
    }

    #[tokio::test]
    async fn test_detect_unreadable_video_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let detector = detector(dir.path().to_path_buf());

        // Runs as a spawned task, so the detection future must be Send
        let handle = tokio::spawn(async move {
            detector
                .detect(Path::new("/definitely/not/here.mp4"))
                .await
        });

        let result = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(ClipwiseError::ToolNotFound(_)) | Err(ClipwiseError::ToolFailed(_))
        ));
    }

    #[test]
    fn test_parse_labels() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "{\"objects\": [\"person\", \"laptop\"]}" } }
            ]
        });
        assert_eq!(parse_labels(&payload).unwrap(), vec!["person", "laptop"]);
    }

    #[test]
    fn test_parse_labels_missing_objects_is_empty() {
        let payload = json!({ "choices": [ { "message": { "content": "{}" } } ] });
        assert!(parse_labels(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_parse_labels_rejects_bad_output() {
        let no_content = json!({ "choices": [] });
        assert!(matches!(parse_labels(&no_content), Err(ClipwiseError::Vision(_))));

        let prose = json!({ "choices": [ { "message": { "content": "I see a dog." } } ] });
        assert!(matches!(parse_labels(&prose), Err(ClipwiseError::Vision(_))));
    }
}
