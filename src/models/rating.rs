use super::cell::{Cell, Columns, column_names};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quartile grade. `A` is the best quartile for the metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    A,
    B,
    C,
    D,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
        };
        f.write_str(s)
    }
}

/// Score of one member for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRow {
    pub project_id: String,
    pub subject_id: String,
    pub username: Option<String>,
    pub metric_name: String,
    pub raw_value: Option<f64>,
    pub deviation_score: Option<f64>,
    pub rank: Option<Rank>,
}

impl RatingRow {
    pub fn columns(&self) -> Columns {
        vec![
            ("project_id".to_string(), Cell::text(&self.project_id)),
            ("subject_id".to_string(), Cell::text(&self.subject_id)),
            ("username".to_string(), Cell::Text(self.username.clone())),
            ("metric_name".to_string(), Cell::text(&self.metric_name)),
            ("raw_value".to_string(), Cell::Ratio(self.raw_value)),
            ("deviation_score".to_string(), Cell::Ratio(self.deviation_score)),
            (
                "rank".to_string(),
                Cell::Text(self.rank.map(|r| r.to_string())),
            ),
        ]
    }

    pub fn headers() -> Vec<String> {
        let empty = RatingRow {
            project_id: String::new(),
            subject_id: String::new(),
            username: None,
            metric_name: String::new(),
            raw_value: None,
            deviation_score: None,
            rank: None,
        };
        column_names(&empty.columns())
    }
}

/// Population statistics of one metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric_name: String,
    pub population: usize,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub q1: Option<f64>,
    pub q2: Option<f64>,
    pub q3: Option<f64>,
}

impl MetricSummary {
    pub fn columns(&self) -> Columns {
        vec![
            ("metric_name".to_string(), Cell::text(&self.metric_name)),
            ("population".to_string(), Cell::Count(self.population)),
            ("mean".to_string(), Cell::Ratio(self.mean)),
            ("stddev".to_string(), Cell::Ratio(self.stddev)),
            ("q1".to_string(), Cell::Ratio(self.q1)),
            ("q2".to_string(), Cell::Ratio(self.q2)),
            ("q3".to_string(), Cell::Ratio(self.q3)),
        ]
    }

    pub fn headers() -> Vec<String> {
        column_names(&Self::default().columns())
    }
}
