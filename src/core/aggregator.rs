//! Folds spans and task attributions into daily, member and whole-project rows.

use crate::core::attribution::{AttributionPolicy, TaskAttribution};
use crate::core::calculator::moving_average::trailing_mean;
use crate::core::calculator::spans::SpanReport;
use crate::models::production::MOVING_AVERAGE_TARGET;
use crate::models::{ColumnLayout, Member, MemberRow, Phase, ProductionRow, WholeRow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// One row per calendar date from the first to the last active date.
/// Worktime lands on the span's start date, volumes on the production date.
pub fn daily_rows(spans: &SpanReport, attributions: &[TaskAttribution]) -> Vec<ProductionRow> {
    let mut rows: BTreeMap<NaiveDate, ProductionRow> = BTreeMap::new();

    for span in spans.spans() {
        let date = span.date();
        let row = rows
            .entry(date)
            .or_insert_with(|| ProductionRow::new(date));
        row.work
            .add_span(span.phase, span.duration_hours, span.post_rejection);
        if let Some(account) = &span.account_id {
            row.working_accounts.insert(account.clone());
        }
    }

    for a in attributions {
        if let Some(date) = a.production_date {
            rows.entry(date)
                .or_insert_with(|| ProductionRow::new(date))
                .volume
                .add(&a.volume);
        }
    }

    fill_date_gaps(&rows.into_values().collect::<Vec<_>>())
}

/// Copy of `rows` (sorted by date) with a zero row for every missing date
/// between the first and the last one.
pub fn fill_date_gaps(rows: &[ProductionRow]) -> Vec<ProductionRow> {
    let mut by_date: BTreeMap<NaiveDate, ProductionRow> =
        rows.iter().map(|r| (r.date, r.clone())).collect();

    let (Some(first), Some(last)) = (
        by_date.keys().next().copied(),
        by_date.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    for date in first.iter_days().take_while(|d| *d <= last) {
        by_date
            .entry(date)
            .or_insert_with(|| ProductionRow::new(date));
    }

    by_date.into_values().collect()
}

/// One row per `(date, account)`. Monitored worktime comes from the member's
/// own spans; production is credited on the task's production date using
/// `policy`.
pub fn member_daily_rows(
    spans: &SpanReport,
    attributions: &[TaskAttribution],
    policy: AttributionPolicy,
) -> Vec<MemberRow> {
    let mut rows: BTreeMap<(NaiveDate, String), MemberRow> = BTreeMap::new();

    for span in spans.spans() {
        let Some(account) = &span.account_id else {
            continue;
        };
        let date = span.date();
        let row = rows
            .entry((date, account.clone()))
            .or_insert_with(|| MemberRow::for_day(account, date));
        row.work
            .add_span(span.phase, span.duration_hours, span.post_rejection);
        row.working_dates.insert(date);
    }

    for a in attributions {
        let Some(date) = a.production_date else {
            continue;
        };

        for phase in Phase::ALL {
            let worktime = a.production_worktime_hour(phase);
            for (account, weight) in a.credits(phase, policy) {
                let row = rows
                    .entry((date, account.clone()))
                    .or_insert_with(|| MemberRow::for_day(&account, date));
                let production = row.production.get_mut(phase);
                production.worktime_hour += worktime * weight;
                production.volume.add_scaled(&a.volume, weight);
            }
        }
    }

    rows.into_values().collect()
}

/// Whole-range rows per member, folded from the daily member rows.
pub fn roll_up_members(daily: &[MemberRow]) -> Vec<MemberRow> {
    let mut per_account: BTreeMap<&str, MemberRow> = BTreeMap::new();

    for row in daily {
        let entry = per_account
            .entry(row.account_id.as_str())
            .or_insert_with(|| MemberRow {
                user_id: row.user_id.clone(),
                username: row.username.clone(),
                ..MemberRow::new(&row.account_id)
            });
        entry.absorb(row);
    }

    per_account.into_values().collect()
}

/// Copy of `rows` labelled with user id and name from the member directory.
pub fn label_members(rows: &[MemberRow], members: &[Member]) -> Vec<MemberRow> {
    let directory: HashMap<&str, &Member> =
        members.iter().map(|m| (m.account_id.as_str(), m)).collect();

    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            if let Some(member) = directory.get(row.account_id.as_str()) {
                row.user_id = member.user_id.clone();
                row.username = member.username.clone();
            }
            row
        })
        .collect()
}

/// Copy of `rows` with trailing moving averages for every
/// `*_hour/annotation_count` ratio column.
pub fn with_moving_averages(
    rows: &[ProductionRow],
    layout: &ColumnLayout,
    window_days: u32,
) -> Vec<ProductionRow> {
    let ratio_table: Vec<Vec<(String, Option<f64>)>> =
        rows.iter().map(|r| r.ratio_columns(layout)).collect();

    let Some(first) = ratio_table.first() else {
        return Vec::new();
    };
    let targets: Vec<(usize, String)> = first
        .iter()
        .enumerate()
        .filter(|(_, (name, _))| name.ends_with(MOVING_AVERAGE_TARGET))
        .map(|(i, (name, _))| (i, name.clone()))
        .collect();

    let mut out: Vec<ProductionRow> = rows.to_vec();
    for (index, name) in targets {
        let series: Vec<(NaiveDate, Option<f64>)> = rows
            .iter()
            .zip(&ratio_table)
            .map(|(row, ratios)| (row.date, ratios[index].1))
            .collect();

        for (row, average) in out.iter_mut().zip(trailing_mean(&series, window_days)) {
            row.moving_averages.insert(name.clone(), average);
        }
    }

    out
}

/// Project totals over the daily rows.
pub fn whole_row(daily: &[ProductionRow]) -> WholeRow {
    let mut whole = WholeRow {
        start_date: daily.first().map(|r| r.date),
        end_date: daily.last().map(|r| r.date),
        ..WholeRow::default()
    };

    for row in daily {
        whole.work.add(&row.work);
        whole.volume.add(&row.volume);
        whole
            .working_accounts
            .extend(row.working_accounts.iter().cloned());
        whole.quality.add_scaled(&row.quality, 1.0);
    }

    whole
}
