use chrono::NaiveDate;
use serde::Serialize;

/// One value of an output table. Keeps numbers numeric until the writer
/// decides how to print them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Count(usize),
    Number(f64),
    Ratio(Option<f64>),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(Some(s.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Count(n) => Some(*n as f64),
            Cell::Number(v) => Some(*v),
            Cell::Ratio(v) => *v,
            Cell::Text(_) | Cell::Date(_) => None,
        }
    }

    /// CSV rendering: nulls become empty fields.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone().unwrap_or_default(),
            Cell::Date(d) => d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            Cell::Count(n) => n.to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Ratio(v) => v.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

/// Ordered `(column name, value)` pairs of one row.
pub type Columns = Vec<(String, Cell)>;

/// Custom volume column names shared by every row of a table, so that all
/// rows expose the same columns in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    pub custom_volume_names: Vec<String>,
}

impl ColumnLayout {
    pub fn new(custom_volume_names: Vec<String>) -> Self {
        Self {
            custom_volume_names,
        }
    }
}

pub fn column_names(columns: &Columns) -> Vec<String> {
    columns.iter().map(|(name, _)| name.clone()).collect()
}

pub fn column_fields(columns: &Columns) -> Vec<String> {
    columns.iter().map(|(_, cell)| cell.to_field()).collect()
}
