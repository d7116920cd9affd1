//! Trailing moving averages over a calendar-keyed series.

use chrono::{Duration, NaiveDate};

/// Mean of the non-null values whose date lies in `[date - (window_days - 1), date]`,
/// for every point of `series`. Dates absent from the series carry no weight.
/// The result is `None` where the window holds no value at all.
pub fn trailing_mean(series: &[(NaiveDate, Option<f64>)], window_days: u32) -> Vec<Option<f64>> {
    let span = Duration::days(i64::from(window_days.max(1)) - 1);

    series
        .iter()
        .map(|(date, _)| {
            let from = *date - span;
            let values: Vec<f64> = series
                .iter()
                .filter(|(d, _)| *d >= from && d <= date)
                .filter_map(|(_, v)| *v)
                .collect();

            if values.is_empty() {
                None
            } else {
                Some(values.iter().sum::<f64>() / values.len() as f64)
            }
        })
        .collect()
}
