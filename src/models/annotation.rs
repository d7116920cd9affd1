use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Annotation counts of one task (or one input data of a task).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationCount {
    pub task_id: String,
    #[serde(default)]
    pub input_data_id: Option<String>,
    #[serde(default)]
    pub label_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub attribute_counts: BTreeMap<String, u64>,
}

impl AnnotationCount {
    /// Number of annotations, optionally restricted to `labels`.
    /// An empty label list means every label counts.
    pub fn total(&self, labels: &[String]) -> u64 {
        if labels.is_empty() {
            return self.label_counts.values().sum();
        }

        self.label_counts
            .iter()
            .filter(|(label, _)| labels.contains(label))
            .map(|(_, count)| count)
            .sum()
    }
}
