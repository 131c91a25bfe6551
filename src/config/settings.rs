//! Configuration settings for Clipwise.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub preflight: PreflightSettings,
    pub transcription: TranscriptionSettings,
    pub vision: VisionSettings,
    pub report: ReportSettings,
    pub session_store: SessionStoreSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory where generated reports are written.
    pub output_dir: String,
    /// Directory for temporary files (extracted audio, sampled frames).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.clipwise".to_string(),
            output_dir: "~/.clipwise/outputs".to_string(),
            temp_dir: "/tmp/clipwise".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Maximum number of requests processed at the same time.
    pub max_workers: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            max_workers: 4,
        }
    }
}

/// Checks run before any capability module is invoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightSettings {
    /// External media tool that must be on the PATH.
    pub required_tool: String,
}

impl Default for PreflightSettings {
    fn default() -> Self {
        Self {
            required_tool: "ffmpeg".to_string(),
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Optional language hint (ISO-639-1).
    pub language: Option<String>,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Maximum concurrent chunk processing.
    pub max_concurrent_chunks: usize,
    /// Write an SRT subtitle file next to the video.
    pub write_subtitles: bool,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
            chunk_duration_seconds: 120,
            max_concurrent_chunks: 3,
            write_subtitles: true,
        }
    }
}

/// Object detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Vision-capable chat model.
    pub model: String,
    /// Frames sampled per second of video.
    pub sample_fps: f64,
    /// Upper bound on sampled frames per video.
    pub max_frames: usize,
    /// Maximum concurrent frame requests.
    pub max_concurrent_frames: usize,
    /// Labels that suggest a screen (and so possibly charts or graphs) is visible.
    pub screen_labels: Vec<String>,
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            sample_fps: 2.0,
            max_frames: 24,
            max_concurrent_frames: 4,
            screen_labels: ["tv", "monitor", "laptop", "cell phone"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Title on the first PDF page and the first slide.
    pub title: String,
    /// Subtitle on the first slide.
    pub subtitle: String,
    /// Characters per line when wrapping PDF body text.
    pub wrap_width: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Video Analysis Summary".to_string(),
            subtitle: "Auto-generated (local)".to_string(),
            wrap_width: 90,
        }
    }
}

/// Session store backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreProvider {
    /// Durable SQLite store (default).
    #[default]
    Sqlite,
    /// Process-lifetime in-memory store.
    Memory,
}

impl std::str::FromStr for SessionStoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(SessionStoreProvider::Sqlite),
            "memory" => Ok(SessionStoreProvider::Memory),
            _ => Err(format!("Unknown session store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SessionStoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStoreProvider::Sqlite => write!(f, "sqlite"),
            SessionStoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStoreSettings {
    /// Store provider (sqlite, memory).
    pub provider: SessionStoreProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for SessionStoreSettings {
    fn default() -> Self {
        Self {
            provider: SessionStoreProvider::Sqlite,
            sqlite_path: "~/.clipwise/history.db".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipwiseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipwise")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded report output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.session_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            port = 8080

            [session_store]
            provider = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.max_workers, 4);
        assert_eq!(settings.session_store.provider, SessionStoreProvider::Memory);
        assert_eq!(settings.preflight.required_tool, "ffmpeg");
        assert_eq!(settings.vision.screen_labels.len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.report.wrap_width = 72;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.report.wrap_width, 72);
        assert_eq!(loaded.transcription.model, "whisper-1");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("SQLite".parse::<SessionStoreProvider>().unwrap(), SessionStoreProvider::Sqlite);
        assert!("redis".parse::<SessionStoreProvider>().is_err());
    }
}
