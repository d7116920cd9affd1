use crate::errors::AppResult;
use crate::export::notify_export_success;
use crate::models::Columns;
use crate::models::cell::column_fields;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write `rows` under `headers`. Every row must expose the header's columns
/// in the same order; an empty table still gets its header line.
pub(crate) fn write_csv(path: &Path, headers: &[String], rows: &[Columns]) -> AppResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(column_fields(row))?;
    }
    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}

/// JSON object of one row; null cells stay `null`.
pub(crate) fn row_to_json(columns: &Columns) -> Value {
    let mut map = Map::new();
    for (name, cell) in columns {
        map.insert(name.clone(), serde_json::to_value(cell).unwrap_or(Value::Null));
    }
    Value::Object(map)
}

pub(crate) fn table_to_json(rows: &[Columns]) -> Value {
    Value::Array(rows.iter().map(row_to_json).collect())
}

/// Pretty-printed JSON.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let json_data = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}
