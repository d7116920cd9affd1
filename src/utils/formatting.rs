//! Number formatting for terminal summaries.

/// `12.50h`
pub fn hours(value: f64) -> String {
    format!("{value:.2}h")
}

/// Fixed precision, `-` for a null value.
pub fn optional_number(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}
