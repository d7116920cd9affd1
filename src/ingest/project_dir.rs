//! One project = one directory of JSON payloads.

use super::{ledger, payload};
use crate::core::logic::ProjectInput;
use crate::core::volume::ProductionOverrides;
use crate::errors::{AppError, AppResult};
use crate::models::Task;
use std::path::{Path, PathBuf};

pub const TASK_FILE: &str = "task.json";
pub const EVENT_FILE: &str = "task_history_event.json";
pub const COMMENT_FILE: &str = "inspection_comment.json";
pub const ANNOTATION_COUNT_FILE: &str = "annotation_count.json";
pub const MEMBER_FILE: &str = "member.json";

/// CSV tables shared by every project of a run.
#[derive(Debug, Clone, Default)]
pub struct ExternalSources {
    pub labor: Option<PathBuf>,
    pub annotation_count: Option<PathBuf>,
    pub input_data_count: Option<PathBuf>,
    pub custom_volume: Option<PathBuf>,
}

fn required(dir: &Path, name: &str) -> AppResult<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(AppError::MissingInput(path))
    }
}

fn optional(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.is_file().then_some(path)
}

/// Project id taken from the payloads, or the directory name when the
/// payloads carry none.
fn project_id_of(dir: &Path, tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| t.project_id.as_str())
        .find(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        })
}

pub fn load_project(dir: &Path, sources: &ExternalSources) -> AppResult<ProjectInput> {
    if !dir.is_dir() {
        return Err(AppError::MissingInput(dir.to_path_buf()));
    }

    let tasks = payload::read_tasks(&required(dir, TASK_FILE)?)?;
    let events = payload::read_events(&required(dir, EVENT_FILE)?)?;
    let comments = match optional(dir, COMMENT_FILE) {
        Some(path) => payload::read_comments(&path)?,
        None => payload::Decoded::default(),
    };
    let annotation_counts = match optional(dir, ANNOTATION_COUNT_FILE) {
        Some(path) => payload::read_annotation_counts(&path)?,
        None => Vec::new(),
    };
    let members = match optional(dir, MEMBER_FILE) {
        Some(path) => payload::read_members(&path)?,
        None => Vec::new(),
    };

    let project_id = project_id_of(dir, &tasks.records);
    let project = Some(project_id.as_str());

    let labor = match &sources.labor {
        Some(path) => ledger::read_labor(path, project)?,
        None => Vec::new(),
    };

    let mut overrides = ProductionOverrides::default();
    if let Some(path) = &sources.annotation_count {
        overrides.annotation_count = ledger::read_count_overrides(path, "annotation_count", project)?;
    }
    if let Some(path) = &sources.input_data_count {
        overrides.input_data_count = ledger::read_count_overrides(path, "input_data_count", project)?;
    }
    if let Some(path) = &sources.custom_volume {
        overrides.custom = ledger::read_custom_volumes(path, project)?;
    }

    let mut ingest_warnings = Vec::new();
    ingest_warnings.extend(tasks.warnings);
    ingest_warnings.extend(events.warnings);
    ingest_warnings.extend(comments.warnings);

    let fill = |id: &mut String| {
        if id.is_empty() {
            *id = project_id.clone();
        }
    };
    let mut tasks = tasks.records;
    let mut events = events.records;
    let mut comments = comments.records;
    tasks.iter_mut().for_each(|t| fill(&mut t.project_id));
    events.iter_mut().for_each(|e| fill(&mut e.project_id));
    comments.iter_mut().for_each(|c| fill(&mut c.project_id));

    tracing::debug!(
        project = %project_id,
        tasks = tasks.len(),
        events = events.len(),
        comments = comments.len(),
        quarantined = ingest_warnings.len(),
        "project payloads loaded"
    );

    Ok(ProjectInput {
        project_id,
        tasks,
        events,
        comments,
        annotation_counts,
        members,
        labor,
        overrides,
        ingest_warnings,
    })
}
