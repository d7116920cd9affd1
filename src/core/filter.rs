//! Task selection applied before the pipeline runs.

use crate::models::{Phase, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Every key must be present on the task with a matching value.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Current phase must be one of these (empty = any).
    #[serde(default)]
    pub phases: Vec<Phase>,
    /// Current status must be one of these (empty = any).
    #[serde(default)]
    pub statuses: Vec<TaskStatus>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.phases.is_empty() && self.statuses.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        let metadata_ok = self.metadata.iter().all(|(key, expected)| {
            task.metadata
                .get(key)
                .is_some_and(|value| value.matches(expected))
        });

        metadata_ok
            && (self.phases.is_empty() || self.phases.contains(&task.phase))
            && (self.statuses.is_empty() || self.statuses.contains(&task.status))
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
