//! CSV tables supplied next to the payloads: the actual-worktime ledger and
//! per-task production overrides.

use crate::core::volume::CustomVolumeTable;
use crate::errors::{AppError, AppResult};
use crate::models::LaborEntry;
use csv::StringRecord;
use std::collections::HashMap;
use std::path::Path;

const PROJECT_COLUMN: &str = "project_id";
const TASK_COLUMN: &str = "task_id";

/// Column positions of a CSV header.
struct Header {
    names: Vec<String>,
}

impl Header {
    fn read(reader: &mut csv::Reader<std::fs::File>) -> AppResult<Self> {
        let names = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        Ok(Self { names })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn require(&self, name: &str, path: &Path) -> AppResult<usize> {
        self.position(name).ok_or_else(|| {
            AppError::Other(format!(
                "{}: missing column '{}'",
                path.display(),
                name
            ))
        })
    }
}

fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

fn number(column: &str, value: &str) -> AppResult<f64> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::InvalidNumber {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Rows without a project id apply to every project.
fn belongs_to(record: &StringRecord, project_col: Option<usize>, project_id: Option<&str>) -> bool {
    match (project_col, project_id) {
        (Some(col), Some(project)) => {
            let value = field(record, col);
            value.is_empty() || value == project
        }
        _ => true,
    }
}

/// `date,account_id,actual_worktime_hour[,project_id]`.
pub fn read_labor(path: &Path, project_id: Option<&str>) -> AppResult<Vec<LaborEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut out = Vec::new();
    for row in reader.deserialize::<LaborEntry>() {
        let entry = row?;
        if let Some(project) = project_id
            && !entry.project_id.is_empty()
            && entry.project_id != project
        {
            continue;
        }
        out.push(entry);
    }

    tracing::debug!(path = %path.display(), rows = out.len(), "labor ledger read");
    Ok(out)
}

/// `[project_id,]task_id,<column>`: one replacement count per task.
pub fn read_count_overrides(
    path: &Path,
    column: &str,
    project_id: Option<&str>,
) -> AppResult<HashMap<String, f64>> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = Header::read(&mut reader)?;
    let task_col = header.require(TASK_COLUMN, path)?;
    let value_col = header.require(column, path)?;
    let project_col = header.position(PROJECT_COLUMN);

    let mut out = HashMap::new();
    for record in reader.records() {
        let record = record?;
        if !belongs_to(&record, project_col, project_id) {
            continue;
        }
        out.insert(
            field(&record, task_col).to_string(),
            number(column, field(&record, value_col))?,
        );
    }

    Ok(out)
}

/// `[project_id,]task_id,<name>...`: every other column is a named volume.
pub fn read_custom_volumes(path: &Path, project_id: Option<&str>) -> AppResult<CustomVolumeTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = Header::read(&mut reader)?;
    let task_col = header.require(TASK_COLUMN, path)?;
    let project_col = header.position(PROJECT_COLUMN);

    let volume_cols: Vec<(usize, String)> = header
        .names
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != task_col && Some(*i) != project_col)
        .map(|(i, name)| (i, name.clone()))
        .collect();

    let mut table = CustomVolumeTable {
        columns: volume_cols.iter().map(|(_, name)| name.clone()).collect(),
        values: HashMap::new(),
    };

    for record in reader.records() {
        let record = record?;
        if !belongs_to(&record, project_col, project_id) {
            continue;
        }
        let values = volume_cols
            .iter()
            .map(|(i, name)| number(name, field(&record, *i)))
            .collect::<AppResult<Vec<f64>>>()?;
        table
            .values
            .insert(field(&record, task_col).to_string(), values);
    }

    Ok(table)
}
