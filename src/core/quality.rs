//! Quality ratios: pointed-out inspection comments per annotation and
//! rejections per task.
//!
//! Only produced tasks are scored. Per member, the figures follow the
//! annotation phase's credits, because comments and rejections are about the
//! annotator's work. Per date, each task weighs 1 on its production date.

use crate::core::attribution::{AttributionPolicy, TaskAttribution};
use crate::models::{MemberRow, Phase, ProductionRow, QualityFigures};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn score_by_date(attributions: &[TaskAttribution]) -> BTreeMap<NaiveDate, QualityFigures> {
    let mut out: BTreeMap<NaiveDate, QualityFigures> = BTreeMap::new();

    for a in attributions {
        if let Some(date) = a.production_date {
            out.entry(date).or_default().add_scaled(&a.quality(), 1.0);
        }
    }

    out
}

pub fn score_by_member(
    attributions: &[TaskAttribution],
    policy: AttributionPolicy,
) -> BTreeMap<(NaiveDate, String), QualityFigures> {
    let mut out: BTreeMap<(NaiveDate, String), QualityFigures> = BTreeMap::new();

    for a in attributions {
        let Some(date) = a.production_date else {
            continue;
        };
        let figures = a.quality();
        for (account, weight) in a.credits(Phase::Annotation, policy) {
            out.entry((date, account))
                .or_default()
                .add_scaled(&figures, weight);
        }
    }

    out
}

/// Copy of the daily rows with their quality figures filled in.
pub fn attach_to_daily(
    rows: &[ProductionRow],
    scores: &BTreeMap<NaiveDate, QualityFigures>,
) -> Vec<ProductionRow> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            row.quality = scores.get(&row.date).cloned().unwrap_or_default();
            row
        })
        .collect()
}

/// Copy of the member daily rows with their quality figures filled in.
/// Scores without a matching row get a row of their own.
pub fn attach_to_members(
    rows: &[MemberRow],
    scores: &BTreeMap<(NaiveDate, String), QualityFigures>,
) -> Vec<MemberRow> {
    let mut by_key: BTreeMap<(NaiveDate, String), MemberRow> = BTreeMap::new();
    for row in rows {
        let Some(date) = row.start_date else {
            continue;
        };
        by_key.insert((date, row.account_id.clone()), row.clone());
    }

    for ((date, account), figures) in scores {
        by_key
            .entry((*date, account.clone()))
            .or_insert_with(|| MemberRow::for_day(account, *date))
            .quality = figures.clone();
    }

    by_key.into_values().collect()
}
