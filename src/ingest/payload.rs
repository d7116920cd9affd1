//! JSON payloads as exported by the annotation platform.

use crate::core::warnings::Warning;
use crate::errors::AppResult;
use crate::models::{
    AnnotationCount, CommentStatus, CommentType, InspectionComment, Member, Phase, PhaseHistory,
    Task, TaskHistoryEvent, TaskMetadata, TaskStatus,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Decoded records plus the ones that were quarantined.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub records: Vec<T>,
    pub warnings: Vec<Warning>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

fn default_stage() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawPhaseHistory {
    phase: String,
    #[serde(default = "default_stage")]
    phase_stage: u32,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    worked: bool,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    project_id: String,
    task_id: String,
    phase: String,
    #[serde(default = "default_stage")]
    phase_stage: u32,
    status: String,
    #[serde(default)]
    histories_by_phase: Vec<RawPhaseHistory>,
    #[serde(default)]
    input_data_id_list: Vec<String>,
    #[serde(default)]
    input_data_count: Option<u64>,
    #[serde(default)]
    annotation_count: Option<u64>,
    #[serde(default)]
    metadata: TaskMetadata,
    #[serde(default)]
    created_datetime: Option<String>,
    #[serde(default)]
    first_acceptance_reached_datetime: Option<String>,
    #[serde(default)]
    first_acceptance_completed_datetime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    project_id: String,
    task_id: String,
    task_history_id: String,
    created_datetime: String,
    phase: String,
    #[serde(default = "default_stage")]
    phase_stage: u32,
    status: String,
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    project_id: String,
    task_id: String,
    comment_id: String,
    phase: String,
    #[serde(default = "default_stage")]
    phase_stage: u32,
    #[serde(default)]
    account_id: Option<String>,
    comment_type: String,
    status: String,
    #[serde(default = "default_true")]
    is_root: bool,
    #[serde(default)]
    created_datetime: Option<String>,
}

/// Field-level conversion failure, turned into a warning by the caller.
struct Unrecognized {
    field: &'static str,
    value: String,
}

impl Unrecognized {
    fn into_warning(self, record: String) -> Warning {
        Warning::UnrecognizedValue {
            record,
            field: self.field.to_string(),
            value: self.value,
        }
    }
}

fn enum_value<T>(
    field: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, Unrecognized> {
    parse(value).ok_or_else(|| Unrecognized {
        field,
        value: value.to_string(),
    })
}

fn datetime(field: &'static str, value: &str) -> Result<DateTime<FixedOffset>, Unrecognized> {
    DateTime::parse_from_rfc3339(value).map_err(|_| Unrecognized {
        field,
        value: value.to_string(),
    })
}

fn optional_datetime(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<FixedOffset>>, Unrecognized> {
    value.map(|v| datetime(field, v)).transpose()
}

fn read_array<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let file = File::open(path)?;
    let records = serde_json::from_reader(BufReader::new(file))?;
    Ok(records)
}

fn convert_task(raw: RawTask) -> Result<Task, Unrecognized> {
    let mut histories = Vec::with_capacity(raw.histories_by_phase.len());
    for h in raw.histories_by_phase {
        histories.push(PhaseHistory {
            phase: enum_value("histories_by_phase.phase", &h.phase, Phase::from_api_str)?,
            phase_stage: h.phase_stage,
            account_id: h.account_id,
            worked: h.worked,
        });
    }

    Ok(Task {
        phase: enum_value("phase", &raw.phase, Phase::from_api_str)?,
        status: enum_value("status", &raw.status, TaskStatus::from_api_str)?,
        created_datetime: optional_datetime("created_datetime", raw.created_datetime.as_deref())?,
        first_acceptance_reached_datetime: optional_datetime(
            "first_acceptance_reached_datetime",
            raw.first_acceptance_reached_datetime.as_deref(),
        )?,
        first_acceptance_completed_datetime: optional_datetime(
            "first_acceptance_completed_datetime",
            raw.first_acceptance_completed_datetime.as_deref(),
        )?,
        input_data_count: raw
            .input_data_count
            .unwrap_or(raw.input_data_id_list.len() as u64),
        annotation_count: raw.annotation_count.unwrap_or(0),
        project_id: raw.project_id,
        task_id: raw.task_id,
        phase_stage: raw.phase_stage,
        histories_by_phase: histories,
        metadata: raw.metadata,
    })
}

fn convert_event(raw: RawEvent, received_index: usize) -> Result<TaskHistoryEvent, Unrecognized> {
    Ok(TaskHistoryEvent {
        created_datetime: datetime("created_datetime", &raw.created_datetime)?,
        phase: enum_value("phase", &raw.phase, Phase::from_api_str)?,
        status: enum_value("status", &raw.status, TaskStatus::from_api_str)?,
        project_id: raw.project_id,
        task_id: raw.task_id,
        task_history_id: raw.task_history_id,
        phase_stage: raw.phase_stage,
        account_id: raw.account_id,
        request: raw.request,
        received_index,
    })
}

fn convert_comment(raw: RawComment) -> Result<InspectionComment, Unrecognized> {
    Ok(InspectionComment {
        phase: enum_value("phase", &raw.phase, Phase::from_api_str)?,
        comment_type: enum_value(
            "comment_type",
            &raw.comment_type,
            CommentType::from_api_str,
        )?,
        status: enum_value("status", &raw.status, CommentStatus::from_api_str)?,
        created_datetime: optional_datetime("created_datetime", raw.created_datetime.as_deref())?,
        project_id: raw.project_id,
        task_id: raw.task_id,
        comment_id: raw.comment_id,
        phase_stage: raw.phase_stage,
        account_id: raw.account_id,
        is_root: raw.is_root,
    })
}

pub fn read_tasks(path: &Path) -> AppResult<Decoded<Task>> {
    let mut out = Decoded::default();
    for raw in read_array::<RawTask>(path)? {
        let record = format!("task {}", raw.task_id);
        match convert_task(raw) {
            Ok(task) => out.records.push(task),
            Err(bad) => out.warnings.push(bad.into_warning(record)),
        }
    }
    Ok(out)
}

/// Events keep their position in the payload as `received_index`,
/// quarantined ones included.
pub fn read_events(path: &Path) -> AppResult<Decoded<TaskHistoryEvent>> {
    let mut out = Decoded::default();
    for (index, raw) in read_array::<RawEvent>(path)?.into_iter().enumerate() {
        let record = format!("task {} history {}", raw.task_id, raw.task_history_id);
        match convert_event(raw, index) {
            Ok(event) => out.records.push(event),
            Err(bad) => out.warnings.push(bad.into_warning(record)),
        }
    }
    Ok(out)
}

pub fn read_comments(path: &Path) -> AppResult<Decoded<InspectionComment>> {
    let mut out = Decoded::default();
    for raw in read_array::<RawComment>(path)? {
        let record = format!("task {} comment {}", raw.task_id, raw.comment_id);
        match convert_comment(raw) {
            Ok(comment) => out.records.push(comment),
            Err(bad) => out.warnings.push(bad.into_warning(record)),
        }
    }
    Ok(out)
}

pub fn read_annotation_counts(path: &Path) -> AppResult<Vec<AnnotationCount>> {
    read_array(path)
}

pub fn read_members(path: &Path) -> AppResult<Vec<Member>> {
    read_array(path)
}
