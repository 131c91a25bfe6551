//! Document report generation for Clipwise.
//!
//! Renders accumulated session text into a PDF summary or a PowerPoint deck.

mod pdf;
mod pptx;

pub use pdf::render_pdf;
pub use pptx::render_pptx;

use crate::config::Settings;
use crate::error::{ClipwiseError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    PowerPoint,
}

impl ReportFormat {
    /// File extension, also used as the canonical format name.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::PowerPoint => "pptx",
        }
    }

    /// Name of the generated file.
    pub fn file_name(&self) -> String {
        format!("summary.{}", self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ClipwiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "pptx" | "ppt" | "powerpoint" => Ok(ReportFormat::PowerPoint),
            other => Err(ClipwiseError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for report generators.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Render `content` into `out_dir` and return the artifact path.
    async fn generate(&self, content: &str, out_dir: &Path, format: ReportFormat) -> Result<PathBuf>;
}

/// Layout options shared by the renderers.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub title: String,
    pub subtitle: String,
    pub wrap_width: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            title: "Video Analysis Summary".to_string(),
            subtitle: "Auto-generated (local)".to_string(),
            wrap_width: 90,
        }
    }
}

/// Renders reports on the local machine.
pub struct LocalReportGenerator {
    layout: ReportLayout,
}

impl LocalReportGenerator {
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }

    /// Create a generator from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(ReportLayout {
            title: settings.report.title.clone(),
            subtitle: settings.report.subtitle.clone(),
            wrap_width: settings.report.wrap_width.max(1),
        })
    }
}

impl Default for LocalReportGenerator {
    fn default() -> Self {
        Self::new(ReportLayout::default())
    }
}

#[async_trait]
impl ReportGenerator for LocalReportGenerator {
    #[instrument(skip(self, content), fields(chars = content.len()))]
    async fn generate(&self, content: &str, out_dir: &Path, format: ReportFormat) -> Result<PathBuf> {
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(format.file_name());

        let layout = self.layout.clone();
        let content = content.to_string();
        let target = path.clone();

        // Rendering is CPU and disk bound
        tokio::task::spawn_blocking(move || match format {
            ReportFormat::Pdf => render_pdf(&content, &layout, &target),
            ReportFormat::PowerPoint => render_pptx(&content, &layout, &target),
        })
        .await
        .map_err(|e| ClipwiseError::Report(format!("Render task failed: {}", e)))??;

        info!("Generated {} report at {}", format, path.display());
        Ok(path)
    }
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Words longer than `width` stay on a line of their own.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let sep = if line.is_empty() { 0 } else { 1 };

        if !line.is_empty() && line_len + sep + word_len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }

        if !line.is_empty() {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}
