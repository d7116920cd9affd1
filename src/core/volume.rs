//! Produced quantities per task, with optional per-task substitutions.

use crate::models::{AnnotationCount, ColumnLayout, ProductionVolume, Task};
use std::collections::HashMap;

/// Extra named volume columns keyed by task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomVolumeTable {
    pub columns: Vec<String>,
    pub values: HashMap<String, Vec<f64>>,
}

impl CustomVolumeTable {
    pub fn get(&self, task_id: &str) -> Vec<(String, f64)> {
        let row = self.values.get(task_id);
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row.and_then(|r| r.get(i)).copied().unwrap_or(0.0);
                (name.clone(), value)
            })
            .collect()
    }
}

/// Per-task replacements for the counts found on the task itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductionOverrides {
    pub annotation_count: HashMap<String, f64>,
    pub input_data_count: HashMap<String, f64>,
    pub custom: CustomVolumeTable,
}

impl ProductionOverrides {
    /// Quantities one produced task contributes.
    pub fn volume_for(&self, task: &Task) -> ProductionVolume {
        let annotation_count = self
            .annotation_count
            .get(&task.task_id)
            .copied()
            .unwrap_or(task.annotation_count as f64);
        let input_data_count = self
            .input_data_count
            .get(&task.task_id)
            .copied()
            .unwrap_or(task.input_data_count as f64);

        ProductionVolume {
            task_count: 1.0,
            input_data_count,
            annotation_count,
            custom: self.custom.get(&task.task_id).into_iter().collect(),
        }
    }

    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout::new(self.custom.columns.clone())
    }
}

/// Copy of `tasks` with `annotation_count` taken from the annotation payload.
/// Tasks without any count row keep their own value. `labels` restricts the
/// counted labels; empty means all.
pub fn apply_annotation_counts(
    tasks: &[Task],
    counts: &[AnnotationCount],
    labels: &[String],
) -> Vec<Task> {
    let mut per_task: HashMap<&str, u64> = HashMap::new();
    for c in counts {
        *per_task.entry(c.task_id.as_str()).or_insert(0) += c.total(labels);
    }

    tasks
        .iter()
        .map(|t| {
            let mut task = t.clone();
            if let Some(count) = per_task.get(t.task_id.as_str()) {
                task.annotation_count = *count;
            }
            task
        })
        .collect()
}
