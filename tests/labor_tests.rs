mod common;
use annoprod::core::labor::{merge_daily, merge_members, unmonitored};
use annoprod::core::warnings::Warning;
use annoprod::models::{LaborEntry, MemberRow, Phase, ProductionRow};
use common::{assert_close, date};

fn labor(day: &str, account: &str, hours: f64, project: &str) -> LaborEntry {
    LaborEntry {
        date: date(day),
        account_id: account.to_string(),
        actual_worktime_hour: hours,
        project_id: project.to_string(),
    }
}

fn member_day(account: &str, day: &str, monitored: f64) -> MemberRow {
    let mut row = MemberRow::for_day(account, date(day));
    row.work.add_span(Phase::Annotation, monitored, false);
    row.working_dates.insert(date(day));
    row
}

#[test]
fn unmonitored_is_actual_minus_monitored_clamped_at_zero() {
    assert_eq!(unmonitored(8.0, 5.0), (3.0, false));
    assert_eq!(unmonitored(4.0, 5.0), (0.0, true));
}

#[test]
fn rounding_noise_is_not_a_clamp() {
    let (hours, clamped) = unmonitored(0.3, 0.1 + 0.2);
    assert!(!clamped);
    assert_eq!(hours, 0.0);

    let rows = vec![member_day("A", "2024-01-01", 0.1 + 0.2)];
    let ledger = vec![labor("2024-01-01", "A", 0.3, "p1")];
    let (merged, warnings) = merge_members(&rows, &ledger, Some("p1"));

    assert!(warnings.is_empty());
    assert_eq!(merged[0].work.unmonitored_worktime_hour, Some(0.0));
}

#[test]
fn member_join_sets_actual_and_flags_clamps() {
    let rows = vec![
        member_day("A", "2024-01-01", 5.0),
        member_day("B", "2024-01-01", 5.0),
    ];
    let ledger = vec![
        labor("2024-01-01", "A", 8.0, "p1"),
        labor("2024-01-01", "B", 4.0, "p1"),
        labor("2024-01-01", "A", 3.0, "other"),
    ];

    let (merged, warnings) = merge_members(&rows, &ledger, Some("p1"));

    let a = merged.iter().find(|r| r.account_id == "A").expect("A");
    let b = merged.iter().find(|r| r.account_id == "B").expect("B");
    assert_eq!(a.work.actual_worktime_hour, Some(8.0));
    assert_close(a.work.unmonitored_worktime_hour.expect("A"), 3.0);
    assert_close(b.work.unmonitored_worktime_hour.expect("B"), 0.0);
    assert!(matches!(
        warnings.as_slice(),
        [Warning::UnmonitoredClamped { account_id: Some(id), .. }] if id == "B"
    ));
}

#[test]
fn labor_without_monitored_work_creates_row_and_warns() {
    let (merged, warnings) = merge_members(&[], &[labor("2024-01-02", "Z", 2.0, "")], Some("p1"));

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].account_id, "Z");
    assert_eq!(merged[0].work.actual_worktime_hour, Some(2.0));
    assert_eq!(merged[0].working_days(), 1);
    assert!(warnings
        .iter()
        .any(|w| matches!(w, Warning::ExternalJoinMismatch { .. })));
}

#[test]
fn monitored_rows_without_labor_keep_null_actual() {
    let rows = vec![member_day("A", "2024-01-01", 1.0)];

    let (merged, warnings) = merge_members(&rows, &[labor("2024-01-02", "A", 1.0, "p1")], None);

    let day1 = merged
        .iter()
        .find(|r| r.start_date == Some(date("2024-01-01")))
        .expect("day 1");
    assert_eq!(day1.work.actual_worktime_hour, None);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn daily_join_sums_accounts() {
    let mut row = ProductionRow::new(date("2024-01-01"));
    row.work.add_span(Phase::Annotation, 5.0, false);
    let ledger = vec![
        labor("2024-01-01", "A", 4.0, "p1"),
        labor("2024-01-01", "B", 3.0, "p1"),
    ];

    let (merged, warnings) = merge_daily(&[row], &ledger, Some("p1"));

    assert!(warnings.is_empty());
    assert_eq!(merged[0].work.actual_worktime_hour, Some(7.0));
    assert_close(merged[0].work.unmonitored_worktime_hour.expect("sum"), 2.0);
    assert_eq!(merged[0].working_user_count(), 2);
}
