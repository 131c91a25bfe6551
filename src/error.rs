//! Error types for Clipwise.

use thiserror::Error;

/// Library-level error type for Clipwise operations.
#[derive(Error, Debug)]
pub enum ClipwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Object detection failed: {0}")]
    Vision(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),
}

impl ClipwiseError {
    /// Short, stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ClipwiseError::Config(_) => "Config",
            ClipwiseError::Transcription(_) => "Transcription",
            ClipwiseError::Vision(_) => "Vision",
            ClipwiseError::Report(_) => "Report",
            ClipwiseError::SessionStore(_) => "SessionStore",
            ClipwiseError::Io(_) => "Io",
            ClipwiseError::Json(_) => "Json",
            ClipwiseError::TomlParse(_) => "TomlParse",
            ClipwiseError::Http(_) => "Http",
            ClipwiseError::Database(_) => "Database",
            ClipwiseError::Archive(_) => "Archive",
            ClipwiseError::OpenAI(_) => "OpenAI",
            ClipwiseError::ToolNotFound(_) => "ToolNotFound",
            ClipwiseError::ToolFailed(_) => "ToolFailed",
            ClipwiseError::UnsupportedFormat(_) => "UnsupportedFormat",
        }
    }
}

/// Result type alias for Clipwise operations.
pub type Result<T> = std::result::Result<T, ClipwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(ClipwiseError::Vision("offline".to_string()).kind(), "Vision");
        assert_eq!(ClipwiseError::UnsupportedFormat("docx".to_string()).kind(), "UnsupportedFormat");

        let io: ClipwiseError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io.kind(), "Io");
    }
}
