//! Flat table rows that exist only for export.

use crate::core::attribution::TaskAttribution;
use crate::core::calculator::spans::{OpenSpan, WorktimeSpan};
use crate::models::cell::column_names;
use crate::models::{Cell, ColumnLayout, Columns, Phase, ProductionVolume};
use chrono::{DateTime, FixedOffset, NaiveDate};

fn datetime_cell(dt: &DateTime<FixedOffset>) -> Cell {
    Cell::Text(Some(dt.to_rfc3339()))
}

/// Per-task listing. Members are the first actors of each phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task_id: String,
    pub phase: Phase,
    pub status: String,
    pub production_date: Option<NaiveDate>,
    pub worktime_hour: [f64; 3],
    pub first_actor: [Option<String>; 3],
    pub volume: ProductionVolume,
    pub rejected_count: u32,
    pub pointed_out_inspection_comment_count: u32,
    pub open_span_count: usize,
}

impl TaskRow {
    pub fn from_attribution(a: &TaskAttribution) -> Self {
        Self {
            task_id: a.task_id.clone(),
            phase: a.phase,
            status: a.status.as_str().to_string(),
            production_date: a.production_date,
            worktime_hour: Phase::ALL.map(|p| a.phases.get(p).worktime_hour),
            first_actor: Phase::ALL.map(|p| a.phases.get(p).first_actor.clone()),
            volume: a.volume.clone(),
            rejected_count: a.rejected_count,
            pointed_out_inspection_comment_count: a.pointed_out_inspection_comment_count,
            open_span_count: a.open_span_count,
        }
    }

    pub fn columns(&self, layout: &ColumnLayout) -> Columns {
        let mut cols: Columns = vec![
            ("task_id".to_string(), Cell::text(&self.task_id)),
            ("phase".to_string(), Cell::text(self.phase.as_str())),
            ("status".to_string(), Cell::text(&self.status)),
            ("production_date".to_string(), Cell::Date(self.production_date)),
        ];

        for (i, phase) in Phase::ALL.iter().enumerate() {
            cols.push((
                format!("{}_worktime_hour", phase.as_str()),
                Cell::Number(self.worktime_hour[i]),
            ));
        }
        cols.push((
            "worktime_hour".to_string(),
            Cell::Number(self.worktime_hour.iter().sum()),
        ));

        for (i, phase) in Phase::ALL.iter().enumerate() {
            cols.push((
                format!("first_{}_account_id", phase.as_str()),
                Cell::Text(self.first_actor[i].clone()),
            ));
        }

        for (name, value) in self.volume.named(layout) {
            cols.push((name, Cell::Number(value)));
        }

        cols.push((
            "rejected_count".to_string(),
            Cell::Count(self.rejected_count as usize),
        ));
        cols.push((
            "pointed_out_inspection_comment_count".to_string(),
            Cell::Count(self.pointed_out_inspection_comment_count as usize),
        ));
        cols.push((
            "open_span_count".to_string(),
            Cell::Count(self.open_span_count),
        ));
        cols
    }

    pub fn headers(layout: &ColumnLayout) -> Vec<String> {
        let empty = TaskRow {
            task_id: String::new(),
            phase: Phase::Annotation,
            status: String::new(),
            production_date: None,
            worktime_hour: [0.0; 3],
            first_actor: [None, None, None],
            volume: ProductionVolume::default(),
            rejected_count: 0,
            pointed_out_inspection_comment_count: 0,
            open_span_count: 0,
        };
        column_names(&empty.columns(layout))
    }
}

/// One reconstructed interval, closed or still open.
pub fn span_columns(span: &WorktimeSpan) -> Columns {
    vec![
        ("task_id".to_string(), Cell::text(&span.task_id)),
        ("phase".to_string(), Cell::text(span.phase.as_str())),
        ("phase_stage".to_string(), Cell::Count(span.phase_stage as usize)),
        ("account_id".to_string(), Cell::Text(span.account_id.clone())),
        ("start_history_id".to_string(), Cell::text(&span.start_event.task_history_id)),
        ("start_datetime".to_string(), datetime_cell(&span.start_event.created_datetime)),
        ("end_history_id".to_string(), Cell::text(&span.end_event.task_history_id)),
        ("end_datetime".to_string(), datetime_cell(&span.end_event.created_datetime)),
        ("duration_hours".to_string(), Cell::Number(span.duration_hours)),
        ("post_rejection".to_string(), Cell::text(&span.post_rejection.to_string())),
        ("open".to_string(), Cell::text("false")),
    ]
}

pub fn open_span_columns(span: &OpenSpan) -> Columns {
    vec![
        ("task_id".to_string(), Cell::text(&span.task_id)),
        ("phase".to_string(), Cell::text(span.phase.as_str())),
        ("phase_stage".to_string(), Cell::Count(span.phase_stage as usize)),
        ("account_id".to_string(), Cell::Text(span.account_id.clone())),
        ("start_history_id".to_string(), Cell::text(&span.start_event.task_history_id)),
        ("start_datetime".to_string(), datetime_cell(&span.start_event.created_datetime)),
        ("end_history_id".to_string(), Cell::Text(None)),
        ("end_datetime".to_string(), Cell::Text(None)),
        ("duration_hours".to_string(), Cell::Ratio(None)),
        ("post_rejection".to_string(), Cell::Text(None)),
        ("open".to_string(), Cell::text("true")),
    ]
}

pub fn span_headers() -> Vec<String> {
    [
        "task_id",
        "phase",
        "phase_stage",
        "account_id",
        "start_history_id",
        "start_datetime",
        "end_history_id",
        "end_datetime",
        "duration_hours",
        "post_rejection",
        "open",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// `project_id` followed by the row's own columns.
pub fn with_project(project_id: &str, mut columns: Columns) -> Columns {
    columns.insert(0, ("project_id".to_string(), Cell::text(project_id)));
    columns
}
