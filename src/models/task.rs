use super::phase::{Phase, TaskStatus};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who worked a phase, as summarized on the task itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseHistory {
    pub phase: Phase,
    #[serde(default = "default_stage")]
    pub phase_stage: u32,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub worked: bool,
}

fn default_stage() -> u32 {
    1
}

/// Scalar value stored in task metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl MetadataValue {
    /// Loose comparison against a filter value written in configuration.
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            MetadataValue::Text(s) => s == expected,
            MetadataValue::Flag(b) => expected.parse::<bool>().is_ok_and(|e| e == *b),
            MetadataValue::Number(n) => expected.parse::<f64>().is_ok_and(|e| e == *n),
        }
    }
}

/// Task metadata. Only keys named in configuration are ever read; the rest
/// travel through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskMetadata {
    entries: BTreeMap<String, MetadataValue>,
}

impl TaskMetadata {
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: &str, value: MetadataValue) {
        self.entries.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub project_id: String,
    pub task_id: String,
    pub phase: Phase,
    pub phase_stage: u32,
    pub status: TaskStatus,
    pub histories_by_phase: Vec<PhaseHistory>,
    pub input_data_count: u64,
    pub annotation_count: u64,
    pub metadata: TaskMetadata,
    pub created_datetime: Option<DateTime<FixedOffset>>,
    pub first_acceptance_reached_datetime: Option<DateTime<FixedOffset>>,
    pub first_acceptance_completed_datetime: Option<DateTime<FixedOffset>>,
}

impl Task {
    pub fn new(project_id: &str, task_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            task_id: task_id.to_string(),
            phase: Phase::Annotation,
            phase_stage: 1,
            status: TaskStatus::NotStarted,
            histories_by_phase: Vec::new(),
            input_data_count: 0,
            annotation_count: 0,
            metadata: TaskMetadata::default(),
            created_datetime: None,
            first_acceptance_reached_datetime: None,
            first_acceptance_completed_datetime: None,
        }
    }

    /// First account recorded as having worked `phase`.
    pub fn first_worker(&self, phase: Phase) -> Option<&str> {
        self.histories_by_phase
            .iter()
            .find(|h| h.phase == phase && h.worked && h.account_id.is_some())
            .and_then(|h| h.account_id.as_deref())
    }
}
