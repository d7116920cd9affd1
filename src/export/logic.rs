use crate::core::logic::ProjectReport;
use crate::core::rating::RatingReport;
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::export::fs_utils::output_path;
use crate::export::json_csv::{table_to_json, write_csv, write_json};
use crate::export::model::{
    TaskRow, open_span_columns, span_columns, span_headers, with_project,
};
use crate::models::{Columns, MemberRow, MetricSummary, ProductionRow, RatingRow, WholeRow};
use serde_json::json;
use std::path::{Path, PathBuf};

pub const DAILY_FILE: &str = "daily_production.csv";
pub const MEMBER_FILE: &str = "member_production.csv";
pub const MEMBER_DAILY_FILE: &str = "member_daily_production.csv";
pub const WHOLE_FILE: &str = "whole_production.csv";
pub const TASK_FILE: &str = "task_attribution.csv";
pub const WARNINGS_FILE: &str = "warnings.json";
pub const PRODUCTION_JSON_FILE: &str = "production.json";

pub const RATING_FILE: &str = "rating.csv";
pub const RATING_SUMMARY_FILE: &str = "rating_summary.csv";
pub const RATING_JSON_FILE: &str = "rating.json";

pub const SPANS_FILE: &str = "spans.csv";
pub const SPANS_JSON_FILE: &str = "spans.json";

/// Table name, headers and rows, in output order.
struct Table {
    file: &'static str,
    headers: Vec<String>,
    rows: Vec<Columns>,
}

fn project_tables(report: &ProjectReport) -> Vec<Table> {
    let layout = &report.layout;
    vec![
        Table {
            file: DAILY_FILE,
            headers: ProductionRow::headers(layout),
            rows: report.daily.iter().map(|r| r.columns(layout)).collect(),
        },
        Table {
            file: MEMBER_FILE,
            headers: MemberRow::headers(layout),
            rows: report.members.iter().map(|r| r.columns(layout)).collect(),
        },
        Table {
            file: MEMBER_DAILY_FILE,
            headers: MemberRow::headers(layout),
            rows: report.member_daily.iter().map(|r| r.columns(layout)).collect(),
        },
        Table {
            file: WHOLE_FILE,
            headers: WholeRow::headers(layout),
            rows: vec![report.whole.columns(layout)],
        },
        Table {
            file: TASK_FILE,
            headers: TaskRow::headers(layout),
            rows: report
                .tasks
                .iter()
                .map(|t| TaskRow::from_attribution(t).columns(layout))
                .collect(),
        },
    ]
}

fn span_rows(report: &ProjectReport) -> Vec<Columns> {
    let mut rows = Vec::new();
    for timeline in report.spans.timelines.values() {
        rows.extend(timeline.spans.iter().map(span_columns));
        rows.extend(timeline.open_spans.iter().map(open_span_columns));
    }
    rows
}

/// High-level writers for pipeline results.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the production tables of one project into `dir`. Returns the
    /// written paths.
    pub fn export_project(
        report: &ProjectReport,
        dir: &Path,
        format: ExportFormat,
        force: bool,
    ) -> AppResult<Vec<PathBuf>> {
        let tables = project_tables(report);
        let mut written = Vec::new();

        match format {
            ExportFormat::Csv => {
                for table in &tables {
                    let path = output_path(dir, table.file, force)?;
                    write_csv(&path, &table.headers, &table.rows)?;
                    written.push(path);
                }
                let path = output_path(dir, WARNINGS_FILE, force)?;
                write_json(&path, &report.diagnostics)?;
                written.push(path);
            }
            ExportFormat::Json => {
                let mut doc = json!({ "project_id": report.project_id });
                for table in &tables {
                    let key = table.file.trim_end_matches(".csv");
                    doc[key] = table_to_json(&table.rows);
                }
                doc["warnings"] = serde_json::to_value(&report.diagnostics)?;

                let path = output_path(dir, PRODUCTION_JSON_FILE, force)?;
                write_json(&path, &doc)?;
                written.push(path);
            }
        }

        tracing::info!(
            project = %report.project_id,
            dir = %dir.display(),
            files = written.len(),
            "production exported"
        );
        Ok(written)
    }

    /// Write the rating tables and the project-prefixed member table.
    pub fn export_rating(
        rating: &RatingReport,
        dir: &Path,
        format: ExportFormat,
        force: bool,
    ) -> AppResult<Vec<PathBuf>> {
        let layout = &rating.layout;
        let rating_rows: Vec<Columns> = rating.rows.iter().map(RatingRow::columns).collect();
        let summary_rows: Vec<Columns> =
            rating.summary.iter().map(MetricSummary::columns).collect();
        let member_rows: Vec<Columns> = rating
            .members
            .iter()
            .map(|(project_id, row)| with_project(project_id, row.columns(layout)))
            .collect();

        let mut written = Vec::new();
        match format {
            ExportFormat::Csv => {
                let mut member_headers = vec!["project_id".to_string()];
                member_headers.extend(MemberRow::headers(layout));

                for (file, headers, rows) in [
                    (RATING_FILE, RatingRow::headers(), &rating_rows),
                    (RATING_SUMMARY_FILE, MetricSummary::headers(), &summary_rows),
                    (MEMBER_FILE, member_headers, &member_rows),
                ] {
                    let path = output_path(dir, file, force)?;
                    write_csv(&path, &headers, rows)?;
                    written.push(path);
                }
            }
            ExportFormat::Json => {
                let doc = json!({
                    "rating": table_to_json(&rating_rows),
                    "rating_summary": table_to_json(&summary_rows),
                    "member_production": table_to_json(&member_rows),
                });
                let path = output_path(dir, RATING_JSON_FILE, force)?;
                write_json(&path, &doc)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Write every closed and open span of one project.
    pub fn export_spans(
        report: &ProjectReport,
        dir: &Path,
        format: ExportFormat,
        force: bool,
    ) -> AppResult<PathBuf> {
        let rows = span_rows(report);
        match format {
            ExportFormat::Csv => {
                let path = output_path(dir, SPANS_FILE, force)?;
                write_csv(&path, &span_headers(), &rows)?;
                Ok(path)
            }
            ExportFormat::Json => {
                let path = output_path(dir, SPANS_JSON_FILE, force)?;
                let doc = json!({
                    "project_id": report.project_id,
                    "spans": table_to_json(&rows),
                    "warnings": serde_json::to_value(&report.diagnostics)?,
                });
                write_json(&path, &doc)?;
                Ok(path)
            }
        }
    }
}
