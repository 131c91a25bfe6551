//! Object and scene detection for Clipwise.
//!
//! Detectors sample frames from a video, label what they see, and report
//! how often each label occurred across the sampled frames.

mod openai;

pub use openai::OpenAiVisionDetector;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a detection run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Object label to number of occurrences across sampled frames.
    pub objects: BTreeMap<String, u32>,
    /// The video likely shows on-screen charts or graphs.
    pub graphs_detected: bool,
}

impl Detection {
    /// Count labels and derive the charts/graphs signal.
    ///
    /// The signal is set when any label is one of `screen_labels` (a screen
    /// in view is the best available hint that a chart is being shown).
    pub fn from_labels<I, S>(labels: I, screen_labels: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut objects: BTreeMap<String, u32> = BTreeMap::new();
        for label in labels {
            let label = label.as_ref().trim().to_lowercase();
            if label.is_empty() {
                continue;
            }
            *objects.entry(label).or_insert(0) += 1;
        }

        let graphs_detected = objects
            .keys()
            .any(|label| screen_labels.iter().any(|s| s.eq_ignore_ascii_case(label)));

        Self {
            objects,
            graphs_detected,
        }
    }

    /// Objects ordered by descending count, ties by label.
    pub fn ranked(&self) -> Vec<(&str, u32)> {
        let mut ranked: Vec<(&str, u32)> = self
            .objects
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        // Stable sort keeps the map's label order for equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Trait for object detection services.
#[async_trait]
pub trait VisionDetector: Send + Sync {
    /// Detect objects in a video file.
    async fn detect(&self, video_path: &Path) -> Result<Detection>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screens() -> Vec<String> {
        vec!["tv".to_string(), "laptop".to_string(), "cell phone".to_string()]
    }

    #[test]
    fn test_from_labels_counts_occurrences() {
        let detection = Detection::from_labels(
            ["person", "Person ", "dog", "person", ""],
            &screens(),
        );
        assert_eq!(detection.objects.get("person"), Some(&3));
        assert_eq!(detection.objects.get("dog"), Some(&1));
        assert_eq!(detection.objects.len(), 2);
        assert!(!detection.graphs_detected);
    }

    #[test]
    fn test_screen_labels_signal_graphs() {
        let detection = Detection::from_labels(["person", "Laptop"], &screens());
        assert!(detection.graphs_detected);

        let detection = Detection::from_labels(["cell phone"], &screens());
        assert!(detection.graphs_detected);
    }

    #[test]
    fn test_ranked_orders_by_count_then_label() {
        let detection = Detection::from_labels(
            ["cup", "person", "person", "book", "person", "cup"],
            &[],
        );
        let ranked = detection.ranked();
        assert_eq!(ranked, vec![("person", 3), ("cup", 2), ("book", 1)]);

        let tied = Detection::from_labels(["zebra", "apple"], &[]);
        assert_eq!(tied.ranked(), vec![("apple", 1), ("zebra", 1)]);
    }

    #[test]
    fn test_empty_detection() {
        let detection = Detection::from_labels(Vec::<String>::new(), &screens());
        assert!(detection.objects.is_empty());
        assert!(!detection.graphs_detected);
        assert!(detection.ranked().is_empty());
    }
}
