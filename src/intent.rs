//! Keyword-based intent classification.
//!
//! Queries are matched case-insensitively against an ordered rule list and
//! the first matching rule wins. A query mentioning both "object" and
//! "graph" is an object-detection request because that rule comes first.
//! Changing the order or the keywords changes user-visible behavior.

use crate::report::ReportFormat;

/// The action requested by a free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Transcribe,
    DetectObjects,
    DetectGraphs,
    GeneratePowerPoint,
    GeneratePdf,
    Unknown,
}

/// Ordered rules: the first entry with a keyword contained in the query wins.
const RULES: &[(&[&str], Intent)] = &[
    (&["transcrib"], Intent::Transcribe),
    (&["object", "what do you see"], Intent::DetectObjects),
    (&["graph"], Intent::DetectGraphs),
    (&["powerpoint", "ppt"], Intent::GeneratePowerPoint),
    (&["pdf", "summarize"], Intent::GeneratePdf),
];

impl Intent {
    /// Report format produced by this intent, if it is a report request.
    pub fn report_format(&self) -> Option<ReportFormat> {
        match self {
            Intent::GeneratePowerPoint => Some(ReportFormat::PowerPoint),
            Intent::GeneratePdf => Some(ReportFormat::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::Transcribe => "transcribe",
            Intent::DetectObjects => "detect_objects",
            Intent::DetectGraphs => "detect_graphs",
            Intent::GeneratePowerPoint => "generate_powerpoint",
            Intent::GeneratePdf => "generate_pdf",
            Intent::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a query. Total and deterministic.
pub fn classify(query: &str) -> Intent {
    let query = query.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Unknown)
}
