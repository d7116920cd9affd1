//! Output rows of the production tables: daily, per member and whole-project.
//!
//! Every row exposes its values through `columns()`, which fixes the CSV
//! column order. Headers are derived from an empty row so they can never
//! drift from the values.

use super::cell::{Cell, ColumnLayout, Columns, column_names};
use super::phase::{Phase, PhaseMap};
use crate::core::calculator::ratio::ratio;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Suffix of the trailing moving-average columns.
pub const MOVING_AVERAGE_SUFFIX: &str = "__moving_average";

/// Ratio columns ending with this suffix get a moving average.
pub const MOVING_AVERAGE_TARGET: &str = "_hour/annotation_count";

/// Sum of two optional figures; `None` only when both are unknown.
pub fn add_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

/// Produced quantities. Fractional once split across members.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductionVolume {
    pub task_count: f64,
    pub input_data_count: f64,
    pub annotation_count: f64,
    pub custom: BTreeMap<String, f64>,
}

impl ProductionVolume {
    pub fn add_scaled(&mut self, other: &ProductionVolume, weight: f64) {
        self.task_count += other.task_count * weight;
        self.input_data_count += other.input_data_count * weight;
        self.annotation_count += other.annotation_count * weight;
        for (name, value) in &other.custom {
            *self.custom.entry(name.clone()).or_insert(0.0) += value * weight;
        }
    }

    pub fn add(&mut self, other: &ProductionVolume) {
        self.add_scaled(other, 1.0);
    }

    pub fn custom_value(&self, name: &str) -> f64 {
        self.custom.get(name).copied().unwrap_or(0.0)
    }

    /// Quantities in column order: built-in counts, then custom volumes.
    pub fn named(&self, layout: &ColumnLayout) -> Vec<(String, f64)> {
        let mut out = vec![
            ("task_count".to_string(), self.task_count),
            ("input_data_count".to_string(), self.input_data_count),
            ("annotation_count".to_string(), self.annotation_count),
        ];
        for name in &layout.custom_volume_names {
            out.push((name.clone(), self.custom_value(name)));
        }
        out
    }
}

/// Worktime figures shared by every production table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkFigures {
    pub monitored_worktime_hour: f64,
    pub monitored_phase_worktime_hour: PhaseMap<f64>,
    pub post_rejection_worktime_hour: PhaseMap<f64>,
    pub actual_worktime_hour: Option<f64>,
    pub unmonitored_worktime_hour: Option<f64>,
}

impl WorkFigures {
    pub fn add_span(&mut self, phase: Phase, hours: f64, post_rejection: bool) {
        self.monitored_worktime_hour += hours;
        *self.monitored_phase_worktime_hour.get_mut(phase) += hours;
        if post_rejection {
            *self.post_rejection_worktime_hour.get_mut(phase) += hours;
        }
    }

    pub fn add(&mut self, other: &WorkFigures) {
        self.monitored_worktime_hour += other.monitored_worktime_hour;
        self.monitored_phase_worktime_hour
            .add(&other.monitored_phase_worktime_hour);
        self.post_rejection_worktime_hour
            .add(&other.post_rejection_worktime_hour);
        self.actual_worktime_hour = add_opt(self.actual_worktime_hour, other.actual_worktime_hour);
        self.unmonitored_worktime_hour =
            add_opt(self.unmonitored_worktime_hour, other.unmonitored_worktime_hour);
    }

    fn columns(&self) -> Columns {
        let mut cols = vec![(
            "monitored_worktime_hour".to_string(),
            Cell::Number(self.monitored_worktime_hour),
        )];
        for (phase, hours) in self.monitored_phase_worktime_hour.iter() {
            cols.push((
                format!("monitored_{}_worktime_hour", phase.as_str()),
                Cell::Number(*hours),
            ));
        }
        for (phase, hours) in self.post_rejection_worktime_hour.iter() {
            cols.push((
                format!("post_rejection_{}_worktime_hour", phase.as_str()),
                Cell::Number(*hours),
            ));
        }
        cols.push((
            "actual_worktime_hour".to_string(),
            Cell::Ratio(self.actual_worktime_hour),
        ));
        cols.push((
            "unmonitored_worktime_hour".to_string(),
            Cell::Ratio(self.unmonitored_worktime_hour),
        ));
        cols
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QualityFigures {
    pub task_count: f64,
    pub annotation_count: f64,
    pub pointed_out_inspection_comment_count: f64,
    pub rejected_count: f64,
}

impl QualityFigures {
    pub fn add_scaled(&mut self, other: &QualityFigures, weight: f64) {
        self.task_count += other.task_count * weight;
        self.annotation_count += other.annotation_count * weight;
        self.pointed_out_inspection_comment_count +=
            other.pointed_out_inspection_comment_count * weight;
        self.rejected_count += other.rejected_count * weight;
    }

    pub fn pointed_out_ratio(&self) -> Option<f64> {
        ratio(
            self.pointed_out_inspection_comment_count,
            self.annotation_count,
        )
    }

    pub fn rejected_ratio(&self) -> Option<f64> {
        ratio(self.rejected_count, self.task_count)
    }

    fn columns(&self) -> Columns {
        vec![
            (
                "pointed_out_inspection_comment_count".to_string(),
                Cell::Number(self.pointed_out_inspection_comment_count),
            ),
            (
                "rejected_count".to_string(),
                Cell::Number(self.rejected_count),
            ),
            (
                "pointed_out_inspection_comment_count/annotation_count".to_string(),
                Cell::Ratio(self.pointed_out_ratio()),
            ),
            (
                "rejected_count/task_count".to_string(),
                Cell::Ratio(self.rejected_ratio()),
            ),
        ]
    }
}

fn volume_columns(volume: &ProductionVolume, layout: &ColumnLayout) -> Columns {
    volume
        .named(layout)
        .into_iter()
        .map(|(name, value)| (name, Cell::Number(value)))
        .collect()
}

/// Worktime-per-quantity ratios of a date or of the whole project.
fn volume_ratios(
    work: &WorkFigures,
    volume: &ProductionVolume,
    layout: &ColumnLayout,
) -> Vec<(String, Option<f64>)> {
    let named = volume.named(layout);
    let mut out = Vec::new();

    for (name, denominator) in &named {
        out.push((
            format!("monitored_worktime_hour/{name}"),
            ratio(work.monitored_worktime_hour, *denominator),
        ));
    }
    for (name, denominator) in &named {
        out.push((
            format!("actual_worktime_hour/{name}"),
            work.actual_worktime_hour
                .and_then(|actual| ratio(actual, *denominator)),
        ));
    }
    for (phase, hours) in work.monitored_phase_worktime_hour.iter() {
        out.push((
            format!("monitored_{}_worktime_hour/annotation_count", phase.as_str()),
            ratio(*hours, volume.annotation_count),
        ));
    }

    out
}

/// Production of one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionRow {
    pub date: NaiveDate,
    pub work: WorkFigures,
    pub volume: ProductionVolume,
    pub working_accounts: BTreeSet<String>,
    pub quality: QualityFigures,
    pub moving_averages: BTreeMap<String, Option<f64>>,
}

impl ProductionRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            work: WorkFigures::default(),
            volume: ProductionVolume::default(),
            working_accounts: BTreeSet::new(),
            quality: QualityFigures::default(),
            moving_averages: BTreeMap::new(),
        }
    }

    pub fn working_user_count(&self) -> usize {
        self.working_accounts.len()
    }

    pub fn ratio_columns(&self, layout: &ColumnLayout) -> Vec<(String, Option<f64>)> {
        volume_ratios(&self.work, &self.volume, layout)
    }

    pub fn columns(&self, layout: &ColumnLayout) -> Columns {
        let mut cols = vec![("date".to_string(), Cell::Date(Some(self.date)))];
        cols.extend(self.work.columns());
        cols.extend(volume_columns(&self.volume, layout));

        let ratios = self.ratio_columns(layout);
        for (name, value) in &ratios {
            cols.push((name.clone(), Cell::Ratio(*value)));
        }
        for (name, _) in ratios
            .iter()
            .filter(|(name, _)| name.ends_with(MOVING_AVERAGE_TARGET))
        {
            let average = self.moving_averages.get(name).copied().flatten();
            cols.push((
                format!("{name}{MOVING_AVERAGE_SUFFIX}"),
                Cell::Ratio(average),
            ));
        }

        cols.push((
            "working_user_count".to_string(),
            Cell::Count(self.working_user_count()),
        ));
        cols.extend(self.quality.columns());
        cols
    }

    pub fn headers(layout: &ColumnLayout) -> Vec<String> {
        column_names(&Self::new(NaiveDate::MIN).columns(layout))
    }
}

/// Totals of a whole project over its active date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WholeRow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub work: WorkFigures,
    pub volume: ProductionVolume,
    pub working_accounts: BTreeSet<String>,
    pub quality: QualityFigures,
}

impl WholeRow {
    pub fn working_user_count(&self) -> usize {
        self.working_accounts.len()
    }

    pub fn ratio_columns(&self, layout: &ColumnLayout) -> Vec<(String, Option<f64>)> {
        volume_ratios(&self.work, &self.volume, layout)
    }

    pub fn columns(&self, layout: &ColumnLayout) -> Columns {
        let mut cols = vec![
            ("start_date".to_string(), Cell::Date(self.start_date)),
            ("end_date".to_string(), Cell::Date(self.end_date)),
        ];
        cols.extend(self.work.columns());
        cols.extend(volume_columns(&self.volume, layout));
        for (name, value) in self.ratio_columns(layout) {
            cols.push((name, Cell::Ratio(value)));
        }
        cols.push((
            "working_user_count".to_string(),
            Cell::Count(self.working_user_count()),
        ));
        cols.extend(self.quality.columns());
        cols
    }

    pub fn headers(layout: &ColumnLayout) -> Vec<String> {
        column_names(&Self::default().columns(layout))
    }
}

/// Production credited to a member in one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseProduction {
    pub worktime_hour: f64,
    pub volume: ProductionVolume,
}

/// Production of one member over `[start_date, end_date]`. Daily member rows
/// have `start_date == end_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRow {
    pub account_id: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub working_dates: BTreeSet<NaiveDate>,
    pub work: WorkFigures,
    pub production: PhaseMap<PhaseProduction>,
    pub quality: QualityFigures,
}

impl MemberRow {
    pub fn new(account_id: &str) -> Self {
        Self {
            account_id: account_id.to_string(),
            user_id: None,
            username: None,
            start_date: None,
            end_date: None,
            working_dates: BTreeSet::new(),
            work: WorkFigures::default(),
            production: PhaseMap::default(),
            quality: QualityFigures::default(),
        }
    }

    pub fn for_day(account_id: &str, date: NaiveDate) -> Self {
        Self {
            start_date: Some(date),
            end_date: Some(date),
            ..Self::new(account_id)
        }
    }

    pub fn working_days(&self) -> usize {
        self.working_dates.len()
    }

    /// Folds another row of the same member into this one, widening the date range.
    pub fn absorb(&mut self, other: &MemberRow) {
        self.start_date = match (self.start_date, other.start_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.end_date = match (self.end_date, other.end_date) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.working_dates.extend(other.working_dates.iter().copied());
        self.work.add(&other.work);
        for phase in Phase::ALL {
            let mine = self.production.get_mut(phase);
            let theirs = other.production.get(phase);
            mine.worktime_hour += theirs.worktime_hour;
            mine.volume.add(&theirs.volume);
        }
        self.quality.add_scaled(&other.quality, 1.0);
    }

    pub fn ratio_columns(&self, layout: &ColumnLayout) -> Vec<(String, Option<f64>)> {
        let mut out = Vec::new();
        for (phase, production) in self.production.iter() {
            for (name, denominator) in production.volume.named(layout) {
                out.push((
                    format!("{}_worktime_hour/{name}", phase.as_str()),
                    ratio(production.worktime_hour, denominator),
                ));
            }
        }
        out
    }

    pub fn columns(&self, layout: &ColumnLayout) -> Columns {
        let mut cols = vec![
            ("account_id".to_string(), Cell::text(&self.account_id)),
            ("user_id".to_string(), Cell::Text(self.user_id.clone())),
            ("username".to_string(), Cell::Text(self.username.clone())),
            ("start_date".to_string(), Cell::Date(self.start_date)),
            ("end_date".to_string(), Cell::Date(self.end_date)),
            ("working_days".to_string(), Cell::Count(self.working_days())),
        ];
        cols.extend(self.work.columns());

        for (phase, production) in self.production.iter() {
            cols.push((
                format!("{}_worktime_hour", phase.as_str()),
                Cell::Number(production.worktime_hour),
            ));
            for (name, value) in production.volume.named(layout) {
                cols.push((format!("{}_{name}", phase.as_str()), Cell::Number(value)));
            }
        }
        for (name, value) in self.ratio_columns(layout) {
            cols.push((name, Cell::Ratio(value)));
        }
        cols.extend(self.quality.columns());
        cols
    }

    pub fn headers(layout: &ColumnLayout) -> Vec<String> {
        column_names(&Self::new("").columns(layout))
    }

    /// Numeric value of a named column, e.g. `annotation_worktime_hour/annotation_count`.
    pub fn metric(&self, name: &str, layout: &ColumnLayout) -> Option<f64> {
        self.columns(layout)
            .into_iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, cell)| cell.as_f64())
    }
}
