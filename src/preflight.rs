//! Pre-flight checks before any capability module runs.
//!
//! Validates the video path and the presence of the required external media
//! tool, so requests fail fast with a prompt the user can act on.

use crate::config::Settings;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Why a request could not proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightFailure {
    /// No video path was given.
    MissingPath,
    /// The video path does not exist.
    FileNotFound(String),
    /// The required tool is not on the search path.
    ToolNotDetected(String),
}

impl PreflightFailure {
    /// Machine-readable reason.
    pub fn reason(&self) -> String {
        match self {
            PreflightFailure::MissingPath => "missing path".to_string(),
            PreflightFailure::FileNotFound(path) => format!("file not found: {}", path),
            PreflightFailure::ToolNotDetected(_) => "required tool not detected".to_string(),
        }
    }

    /// Prompt shown to the user.
    pub fn clarification_prompt(&self) -> String {
        match self {
            PreflightFailure::MissingPath => {
                "Please provide the absolute path to a local .mp4 file.".to_string()
            }
            PreflightFailure::FileNotFound(path) => format!("Video file not found: {}", path),
            PreflightFailure::ToolNotDetected(tool) => {
                format!("{} not detected. {}", tool, install_hint(tool))
            }
        }
    }
}

impl std::fmt::Display for PreflightFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason())
    }
}

/// Validator for per-request preconditions.
#[derive(Debug, Clone)]
pub struct Preflight {
    required_tool: String,
    search_path: Option<OsString>,
}

impl Preflight {
    /// Validator that looks for `required_tool` on the process PATH.
    pub fn new(required_tool: &str) -> Self {
        Self {
            required_tool: required_tool.to_string(),
            search_path: None,
        }
    }

    /// Create a validator from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.preflight.required_tool)
    }

    /// Look for the tool in `paths` instead of the process PATH.
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Name of the tool this validator requires.
    pub fn required_tool(&self) -> &str {
        &self.required_tool
    }

    /// Locate the required tool, if installed.
    pub fn locate_tool(&self) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(&self.required_tool, Some(paths), cwd)
            }
            None => which::which(&self.required_tool),
        };
        found.ok()
    }

    /// Check, in order: path given, path exists, tool discoverable.
    pub fn validate(&self, video_path: &str) -> Result<(), PreflightFailure> {
        if video_path.is_empty() {
            return Err(PreflightFailure::MissingPath);
        }

        if !Path::new(video_path).exists() {
            return Err(PreflightFailure::FileNotFound(video_path.to_string()));
        }

        match self.locate_tool() {
            Some(path) => {
                debug!("Found {} at {}", self.required_tool, path.display());
                Ok(())
            }
            None => Err(PreflightFailure::ToolNotDetected(self.required_tool.clone())),
        }
    }
}

/// Platform-specific install hint for an external tool.
pub fn install_hint(tool: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("Please install it using: brew install {}", tool)
    } else if cfg!(target_os = "linux") {
        format!(
            "Please install it using: sudo apt install {} (or your package manager)",
            tool
        )
    } else if tool == "ffmpeg" {
        "Install from: https://ffmpeg.org/download.html".to_string()
    } else {
        format!("Please install {} and ensure it's in your PATH.", tool)
    }
}

/// Create an empty executable named `name` in `dir`, standing in for a real tool.
#[cfg(test)]
pub(crate) fn fake_tool(dir: &Path, name: &str) {
    let path = if cfg!(windows) {
        dir.join(format!("{}.exe", name))
    } else {
        dir.join(name)
    };
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path() {
        let preflight = Preflight::new("ffmpeg");
        let failure = preflight.validate("").unwrap_err();
        assert_eq!(failure, PreflightFailure::MissingPath);
        assert_eq!(failure.reason(), "missing path");
        assert!(failure.clarification_prompt().contains(".mp4"));
    }

    #[test]
    fn test_file_not_found() {
        let preflight = Preflight::new("ffmpeg");
        let failure = preflight.validate("/definitely/not/here.mp4").unwrap_err();
        assert_eq!(failure.reason(), "file not found: /definitely/not/here.mp4");
        assert_eq!(
            failure.clarification_prompt(),
            "Video file not found: /definitely/not/here.mp4"
        );
    }

    #[test]
    fn test_tool_not_detected() {
        let tools = tempfile::tempdir().unwrap();
        let video = tempfile::NamedTempFile::new().unwrap();
        let preflight = Preflight::new("ffmpeg").with_search_path(tools.path());

        let failure = preflight
            .validate(video.path().to_str().unwrap())
            .unwrap_err();
        assert_eq!(failure, PreflightFailure::ToolNotDetected("ffmpeg".to_string()));
        assert_eq!(failure.reason(), "required tool not detected");
        assert!(failure.clarification_prompt().starts_with("ffmpeg not detected."));
    }

    #[test]
    fn test_all_checks_pass() {
        let tools = tempfile::tempdir().unwrap();
        fake_tool(tools.path(), "ffmpeg");
        let video = tempfile::NamedTempFile::new().unwrap();
        let preflight = Preflight::new("ffmpeg").with_search_path(tools.path());

        assert!(preflight.locate_tool().is_some());
        assert!(preflight.validate(video.path().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_path_checked_before_tool() {
        let tools = tempfile::tempdir().unwrap();
        let preflight = Preflight::new("ffmpeg").with_search_path(tools.path());

        assert_eq!(preflight.validate("").unwrap_err(), PreflightFailure::MissingPath);
        assert!(matches!(
            preflight.validate("/nope.mp4").unwrap_err(),
            PreflightFailure::FileNotFound(_)
        ));
    }
}
