//! Query orchestrator for Clipwise.
//!
//! Validates each request, classifies the query, runs the matching
//! capability and records the conversation in the session store. Capability
//! failures come back as clarification replies, never as errors.

use crate::config::{SessionStoreProvider, Settings};
use crate::error::{ClipwiseError, Result};
use crate::intent::{classify, Intent};
use crate::preflight::Preflight;
use crate::report::{LocalReportGenerator, ReportFormat, ReportGenerator};
use crate::session::{
    history_text, normalize_session_id, MemorySessionStore, Role, SessionStore,
    SqliteSessionStore, Turn,
};
use crate::transcription::{Transcriber, WhisperTranscriber};
use crate::vision::{Detection, OpenAiVisionDetector, VisionDetector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Longest transcript returned as an answer, in characters.
pub const MAX_TRANSCRIPT_CHARS: usize = 2000;

pub const NEED_CONTENT_PROMPT: &str = "I need content first (for example, run 'Transcribe the video'). Do you want to transcribe now?";

pub const UNKNOWN_INTENT_PROMPT: &str = "Did you mean: 'Transcribe the video', 'What objects are shown', 'Create a PowerPoint', or 'Summarize to PDF'?";

const GRAPHS_PRESENT: &str = "Charts or graphs likely present.";
const GRAPHS_ABSENT: &str = "Charts or graphs not detected.";
const GRAPHS_ADVISORY: &str = "Possible charts or graphs detected on screen.";

/// Structured answer to a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub session_id: String,
    pub answer: String,
    pub artifacts: Vec<String>,
    pub needs_clarification: bool,
    pub clarification_prompt: String,
}

impl Reply {
    /// A reply carrying an answer and its artifacts.
    pub fn answered(session_id: &str, answer: impl Into<String>, artifacts: Vec<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            answer: answer.into(),
            artifacts,
            ..Default::default()
        }
    }

    /// A reply asking the user for something.
    pub fn clarification(session_id: &str, prompt: impl Into<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            needs_clarification: true,
            clarification_prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Result of a report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub session_id: String,
    pub path: String,
}

/// A session's history, serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    /// JSON array of `{role, content}` objects.
    pub history_json: String,
}

/// The main orchestrator for Clipwise.
pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    transcriber: Arc<dyn Transcriber>,
    vision: Arc<dyn VisionDetector>,
    reporter: Arc<dyn ReportGenerator>,
    preflight: Preflight,
    output_dir: PathBuf,
}

impl Orchestrator {
    /// Create an orchestrator with the configured components.
    ///
    /// Fails if any capability cannot be initialized.
    pub fn new(settings: Settings) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match settings.session_store.provider {
            SessionStoreProvider::Sqlite => {
                Arc::new(SqliteSessionStore::new(&settings.sqlite_path())?)
            }
            SessionStoreProvider::Memory => Arc::new(MemorySessionStore::new()),
        };

        let transcriber = Arc::new(WhisperTranscriber::from_settings(&settings)?);
        let vision = Arc::new(OpenAiVisionDetector::from_settings(&settings)?);
        let reporter = Arc::new(LocalReportGenerator::from_settings(&settings));

        info!(
            "Using {} session store, transcription model {}, vision model {}",
            settings.session_store.provider, settings.transcription.model, settings.vision.model
        );

        Ok(Self::with_components(
            store,
            transcriber,
            vision,
            reporter,
            Preflight::from_settings(&settings),
            settings.output_dir(),
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        store: Arc<dyn SessionStore>,
        transcriber: Arc<dyn Transcriber>,
        vision: Arc<dyn VisionDetector>,
        reporter: Arc<dyn ReportGenerator>,
        preflight: Preflight,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            transcriber,
            vision,
            reporter,
            preflight,
            output_dir,
        }
    }

    /// Answer one query about a video.
    ///
    /// Only a failure to record the user's turn is returned as an error.
    #[instrument(skip(self, query), fields(session = %session_id))]
    pub async fn process_query(&self, session_id: &str, query: &str, video_path: &str) -> Result<Reply> {
        let session_id = normalize_session_id(session_id);

        if let Err(failure) = self.preflight.validate(video_path) {
            info!("Preflight failed: {}", failure);
            return Ok(Reply::clarification(&session_id, failure.clarification_prompt()));
        }

        let intent = classify(query);
        info!("Classified query as {}", intent);

        // Reports summarize what came before this query
        let prior = match intent.report_format() {
            Some(_) => Some(self.store.get(&session_id).await),
            None => None,
        };

        self.store.append(&session_id, Role::User, query).await?;

        let reply = match self.dispatch(&session_id, intent, Path::new(video_path), prior).await {
            Ok(reply) => reply,
            Err(e) => return Ok(self.failure_reply(&session_id, intent, e)),
        };

        if !reply.answer.is_empty() {
            if let Err(e) = self.store.append(&session_id, Role::Assistant, &reply.answer).await {
                return Ok(self.failure_reply(&session_id, intent, e));
            }
        }

        Ok(reply)
    }

    async fn dispatch(
        &self,
        session_id: &str,
        intent: Intent,
        video_path: &Path,
        prior: Option<Result<Vec<Turn>>>,
    ) -> Result<Reply> {
        match intent {
            Intent::Transcribe => {
                let transcription = self.transcriber.transcribe(video_path).await?;
                let answer = truncate_chars(&transcription.transcript, MAX_TRANSCRIPT_CHARS);
                let artifacts = transcription
                    .subtitle_path
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                Ok(Reply::answered(session_id, answer, artifacts))
            }
            Intent::DetectObjects => {
                let detection = self.vision.detect(video_path).await?;
                Ok(Reply::answered(session_id, describe_objects(&detection), Vec::new()))
            }
            Intent::DetectGraphs => {
                let detection = self.vision.detect(video_path).await?;
                Ok(Reply::answered(session_id, describe_graphs(&detection), Vec::new()))
            }
            Intent::GeneratePowerPoint | Intent::GeneratePdf => {
                let turns = match prior {
                    Some(turns) => turns?,
                    None => self.store.get(session_id).await?,
                };
                let content = history_text(&turns);
                if content.trim().is_empty() {
                    return Ok(Reply::clarification(session_id, NEED_CONTENT_PROMPT));
                }

                let format = if intent == Intent::GeneratePowerPoint {
                    ReportFormat::PowerPoint
                } else {
                    ReportFormat::Pdf
                };
                let path = self.reporter.generate(&content, &self.output_dir, format).await?;
                Ok(Reply::answered(
                    session_id,
                    report_confirmation(format),
                    vec![path.display().to_string()],
                ))
            }
            Intent::Unknown => Ok(Reply::clarification(session_id, UNKNOWN_INTENT_PROMPT)),
        }
    }

    fn failure_reply(&self, session_id: &str, intent: Intent, e: ClipwiseError) -> Reply {
        error!("{} failed for session {}: {}", intent, session_id, e);
        Reply::clarification(
            session_id,
            format!("Backend processing error: {}: {}", e.kind(), e),
        )
    }

    /// Render the whole session history into a report.
    ///
    /// Runs even when the history is empty. Unsupported formats are rejected
    /// by the report module.
    #[instrument(skip(self), fields(session = %session_id))]
    pub async fn generate_report(&self, session_id: &str, format: &str) -> Result<ReportResponse> {
        let session_id = normalize_session_id(session_id);
        let format: ReportFormat = format.parse()?;

        let turns = self.store.get(&session_id).await?;
        if turns.is_empty() {
            warn!("Generating report for session with no history");
        }

        let path = self
            .reporter
            .generate(&history_text(&turns), &self.output_dir, format)
            .await?;

        Ok(ReportResponse {
            session_id,
            path: path.display().to_string(),
        })
    }

    /// Get the turns of a session. Unknown sessions are empty.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<Turn>> {
        self.store.get(&normalize_session_id(session_id)).await
    }

    /// Get the turns of a session as JSON.
    pub async fn history_json(&self, session_id: &str) -> Result<HistoryResponse> {
        let session_id = normalize_session_id(session_id);
        let turns = self.store.get(&session_id).await?;
        Ok(HistoryResponse {
            history_json: serde_json::to_string(&turns)?,
            session_id,
        })
    }
}

/// `Detected objects: label(count), ...` by descending count.
pub fn describe_objects(detection: &Detection) -> String {
    let ranked = detection.ranked();
    let listing = if ranked.is_empty() {
        "none".to_string()
    } else {
        ranked
            .iter()
            .map(|(label, count)| format!("{}({})", label, count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut answer = format!("Detected objects: {}", listing);
    if detection.graphs_detected {
        answer.push('\n');
        answer.push_str(GRAPHS_ADVISORY);
    }
    answer
}

pub fn describe_graphs(detection: &Detection) -> String {
    if detection.graphs_detected {
        GRAPHS_PRESENT.to_string()
    } else {
        GRAPHS_ABSENT.to_string()
    }
}

fn report_confirmation(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::PowerPoint => "Generated PowerPoint with key points.",
        ReportFormat::Pdf => "Generated PDF summary.",
    }
}

/// First `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
