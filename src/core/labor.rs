//! Joins the external actual-worktime ledger with monitored worktime.

use crate::core::warnings::Warning;
use crate::models::{LaborEntry, MemberRow, ProductionRow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Differences smaller than this are rounding noise, not a clamp.
const CLAMP_TOLERANCE_HOUR: f64 = 1e-9;

/// `max(actual - monitored, 0)` and whether clamping was needed.
pub fn unmonitored(actual: f64, monitored: f64) -> (f64, bool) {
    let diff = actual - monitored;
    if diff < -CLAMP_TOLERANCE_HOUR {
        (0.0, true)
    } else {
        (diff.max(0.0), false)
    }
}

/// Ledger rows of `project_id` (all rows when `None` or when a row carries
/// no project), summed per `(date, account)`.
fn ledger(labor: &[LaborEntry], project_id: Option<&str>) -> BTreeMap<(NaiveDate, String), f64> {
    let mut out: BTreeMap<(NaiveDate, String), f64> = BTreeMap::new();

    for entry in labor {
        if let Some(project) = project_id
            && !entry.project_id.is_empty()
            && entry.project_id != project
        {
            continue;
        }
        *out.entry((entry.date, entry.account_id.clone()))
            .or_insert(0.0) += entry.actual_worktime_hour;
    }

    out
}

/// Outer join on `(date, account_id)` with the member daily rows.
pub fn merge_members(
    rows: &[MemberRow],
    labor: &[LaborEntry],
    project_id: Option<&str>,
) -> (Vec<MemberRow>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut by_key: BTreeMap<(NaiveDate, String), MemberRow> = rows
        .iter()
        .filter_map(|r| r.start_date.map(|d| ((d, r.account_id.clone()), r.clone())))
        .collect();

    for ((date, account), actual) in ledger(labor, project_id) {
        let row = by_key.entry((date, account.clone())).or_insert_with(|| {
            MemberRow::for_day(&account, date)
        });
        if row.work.monitored_worktime_hour == 0.0 {
            warnings.push(Warning::ExternalJoinMismatch {
                date,
                account_id: Some(account.clone()),
            });
        }

        let (hours, clamped) = unmonitored(actual, row.work.monitored_worktime_hour);
        if clamped {
            warnings.push(Warning::UnmonitoredClamped {
                date,
                account_id: Some(account.clone()),
                actual_worktime_hour: actual,
                monitored_worktime_hour: row.work.monitored_worktime_hour,
            });
        }
        row.work.actual_worktime_hour = Some(actual);
        row.work.unmonitored_worktime_hour = Some(hours);
        if actual > 0.0 {
            row.working_dates.insert(date);
        }
    }

    (by_key.into_values().collect(), warnings)
}

/// Join on `date` with the daily rows, labor summed across accounts.
pub fn merge_daily(
    rows: &[ProductionRow],
    labor: &[LaborEntry],
    project_id: Option<&str>,
) -> (Vec<ProductionRow>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut per_date: BTreeMap<NaiveDate, (f64, BTreeSet<String>)> = BTreeMap::new();
    for ((date, account), actual) in ledger(labor, project_id) {
        let entry = per_date.entry(date).or_default();
        entry.0 += actual;
        if actual > 0.0 {
            entry.1.insert(account);
        }
    }

    let mut by_date: BTreeMap<NaiveDate, ProductionRow> =
        rows.iter().map(|r| (r.date, r.clone())).collect();

    for (date, (actual, accounts)) in per_date {
        let row = by_date
            .entry(date)
            .or_insert_with(|| ProductionRow::new(date));

        let (hours, clamped) = unmonitored(actual, row.work.monitored_worktime_hour);
        if clamped {
            warnings.push(Warning::UnmonitoredClamped {
                date,
                account_id: None,
                actual_worktime_hour: actual,
                monitored_worktime_hour: row.work.monitored_worktime_hour,
            });
        }
        row.work.actual_worktime_hour = Some(actual);
        row.work.unmonitored_worktime_hour = Some(hours);
        row.working_accounts.extend(accounts);
    }

    (by_date.into_values().collect(), warnings)
}
