//! Scores members against their peers: deviation scores and quartile ranks,
//! computed over one project or over several projects pooled together.

use crate::core::calculator::stats::{mean, population_stddev, quartiles};
use crate::models::{ColumnLayout, MemberRow, MetricSummary, Rank, RatingRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPolicy {
    /// Member column name, e.g. `annotation_worktime_hour/annotation_count`.
    pub name: String,
    pub direction: Direction,
}

impl MetricPolicy {
    pub fn new(name: &str, direction: Direction) -> Self {
        Self {
            name: name.to_string(),
            direction,
        }
    }
}

/// `base + scale * z`, with `z` sign-flipped for lower-is-better metrics so
/// that a higher score is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationPolicy {
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_base() -> f64 {
    50.0
}

fn default_scale() -> f64 {
    10.0
}

impl Default for DeviationPolicy {
    fn default() -> Self {
        Self {
            base: default_base(),
            scale: default_scale(),
        }
    }
}

/// A spread within rounding noise of the mean counts as no spread.
pub fn is_zero_spread(mean: f64, stddev: f64) -> bool {
    stddev <= f64::EPSILON * mean.abs().max(1.0)
}

impl DeviationPolicy {
    pub fn score(&self, value: f64, mean: f64, stddev: f64, direction: Direction) -> f64 {
        if is_zero_spread(mean, stddev) {
            return self.base;
        }
        let sign = match direction {
            Direction::LowerIsBetter => -1.0,
            Direction::HigherIsBetter => 1.0,
        };
        self.base + self.scale * sign * (value - mean) / stddev
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Members below this cumulative monitored worktime are left out of the
    /// population and are not scored.
    #[serde(default)]
    pub min_worktime_hour: f64,
    #[serde(default)]
    pub deviation: DeviationPolicy,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricPolicy>,
}

pub fn default_metrics() -> Vec<MetricPolicy> {
    vec![
        MetricPolicy::new(
            "annotation_worktime_hour/annotation_count",
            Direction::LowerIsBetter,
        ),
        MetricPolicy::new(
            "inspection_worktime_hour/annotation_count",
            Direction::LowerIsBetter,
        ),
        MetricPolicy::new(
            "acceptance_worktime_hour/annotation_count",
            Direction::LowerIsBetter,
        ),
        MetricPolicy::new(
            "pointed_out_inspection_comment_count/annotation_count",
            Direction::LowerIsBetter,
        ),
        MetricPolicy::new("rejected_count/task_count", Direction::LowerIsBetter),
    ]
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            min_worktime_hour: 0.0,
            deviation: DeviationPolicy::default(),
            metrics: default_metrics(),
        }
    }
}

/// Whole-range member rows of one project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMembers {
    pub project_id: String,
    pub layout: ColumnLayout,
    pub rows: Vec<MemberRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingReport {
    pub rows: Vec<RatingRow>,
    pub summary: Vec<MetricSummary>,
    /// Member rows of every project, tagged with their project id.
    pub members: Vec<(String, MemberRow)>,
    /// Union of the projects' custom volume columns.
    pub layout: ColumnLayout,
}

/// Quartile rank; boundaries fall toward the better rank.
pub fn rank_for(value: f64, (q1, q2, q3): (f64, f64, f64), direction: Direction) -> Rank {
    match direction {
        Direction::LowerIsBetter => {
            if value <= q1 {
                Rank::A
            } else if value <= q2 {
                Rank::B
            } else if value <= q3 {
                Rank::C
            } else {
                Rank::D
            }
        }
        Direction::HigherIsBetter => {
            if value >= q3 {
                Rank::A
            } else if value >= q2 {
                Rank::B
            } else if value >= q1 {
                Rank::C
            } else {
                Rank::D
            }
        }
    }
}

fn merged_layout(projects: &[ProjectMembers]) -> ColumnLayout {
    let mut names: Vec<String> = Vec::new();
    for p in projects {
        for name in &p.layout.custom_volume_names {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    ColumnLayout::new(names)
}

/// Rate every member of every project against the pooled population.
pub fn rate(projects: &[ProjectMembers], config: &RatingConfig) -> RatingReport {
    let layout = merged_layout(projects);
    let members: Vec<(String, MemberRow)> = projects
        .iter()
        .flat_map(|p| p.rows.iter().map(|r| (p.project_id.clone(), r.clone())))
        .collect();

    let mut rows = Vec::new();
    let mut summary = Vec::new();

    for metric in &config.metrics {
        let values: Vec<(Option<f64>, bool)> = members
            .iter()
            .map(|(_, row)| {
                let value = row
                    .metric(&metric.name, &layout)
                    .filter(|v| v.is_finite());
                let eligible = value.is_some()
                    && row.work.monitored_worktime_hour >= config.min_worktime_hour;
                (value, eligible)
            })
            .collect();

        let population: Vec<f64> = values
            .iter()
            .filter(|(_, eligible)| *eligible)
            .filter_map(|(v, _)| *v)
            .collect();

        let m = mean(&population);
        let sd = population_stddev(&population);
        let q = quartiles(&population);

        summary.push(MetricSummary {
            metric_name: metric.name.clone(),
            population: population.len(),
            mean: m,
            stddev: sd,
            q1: q.map(|q| q.0),
            q2: q.map(|q| q.1),
            q3: q.map(|q| q.2),
        });

        for ((project_id, row), (value, eligible)) in members.iter().zip(&values) {
            let scored = value.filter(|_| *eligible);
            let deviation_score = match (scored, m, sd) {
                (Some(v), Some(m), Some(sd)) => {
                    Some(config.deviation.score(v, m, sd, metric.direction))
                }
                _ => None,
            };
            let rank = match (scored, q) {
                (Some(v), Some(q)) => Some(rank_for(v, q, metric.direction)),
                _ => None,
            };

            rows.push(RatingRow {
                project_id: project_id.clone(),
                subject_id: row.account_id.clone(),
                username: row.username.clone(),
                metric_name: metric.name.clone(),
                raw_value: *value,
                deviation_score,
                rank,
            });
        }

        tracing::debug!(
            metric = %metric.name,
            population = population.len(),
            "metric rated"
        );
    }

    RatingReport {
        rows,
        summary,
        members,
        layout,
    }
}
