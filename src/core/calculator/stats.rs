//! Population statistics used by the rating engine.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`). Exactly 0 when every
/// value is the same, whatever rounding the mean picked up.
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.iter().all(|v| *v == values[0]) {
        return Some(0.0);
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percentile of already sorted data, linear interpolation between ranks.
pub fn percentile(sorted: &[f64], percentile: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        n => {
            let index = (percentile / 100.0) * (n - 1) as f64;
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;

            if lower == upper || sorted[lower] == sorted[upper] {
                Some(sorted[lower])
            } else {
                let weight = index - lower as f64;
                Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
            }
        }
    }
}

/// First, second and third quartile of unsorted values.
pub fn quartiles(values: &[f64]) -> Option<(f64, f64, f64)> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    Some((
        percentile(&sorted, 25.0)?,
        percentile(&sorted, 50.0)?,
        percentile(&sorted, 75.0)?,
    ))
}
