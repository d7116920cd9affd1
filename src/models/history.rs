use super::phase::{Phase, TaskStatus};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// One status change of a task, as recorded by the annotation platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskHistoryEvent {
    pub project_id: String,
    pub task_id: String,
    pub task_history_id: String,
    pub created_datetime: DateTime<FixedOffset>,
    pub phase: Phase,
    pub phase_stage: u32,
    pub status: TaskStatus,
    pub account_id: Option<String>,
    /// Opaque request payload, passed through untouched.
    pub request: Option<serde_json::Value>,
    /// Position in the received payload. Breaks ties between equal timestamps.
    pub received_index: usize,
}

impl TaskHistoryEvent {
    pub fn new(
        project_id: &str,
        task_id: &str,
        task_history_id: &str,
        created_datetime: DateTime<FixedOffset>,
        phase: Phase,
        status: TaskStatus,
        account_id: Option<&str>,
    ) -> Self {
        Self {
            project_id: project_id.to_string(),
            task_id: task_id.to_string(),
            task_history_id: task_history_id.to_string(),
            created_datetime,
            phase,
            phase_stage: 1,
            status,
            account_id: account_id.map(str::to_string),
            request: None,
            received_index: 0,
        }
    }

    /// Explicit ordering key: timestamp first, then arrival order.
    pub fn order_key(&self) -> (DateTime<FixedOffset>, usize) {
        (self.created_datetime, self.received_index)
    }

    /// Calendar date in the event's own UTC offset.
    pub fn date(&self) -> NaiveDate {
        self.created_datetime.date_naive()
    }
}
