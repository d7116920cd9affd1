mod common;
use annoprod::core::attribution::{
    AttributionPolicy, CompletionCriteria, attribute_tasks,
};
use annoprod::core::calculator::moving_average::trailing_mean;
use annoprod::core::calculator::ratio::ratio;
use annoprod::core::calculator::spans::build_spans;
use annoprod::core::calculator::stats::quartiles;
use annoprod::core::volume::ProductionOverrides;
use annoprod::models::{Phase, TaskHistoryEvent, TaskStatus};
use chrono::{Duration, NaiveDate};
use common::{dt, received, task};
use proptest::prelude::*;

fn phase_strategy() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Annotation),
        Just(Phase::Inspection),
        Just(Phase::Acceptance),
    ]
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Working),
        Just(TaskStatus::Break),
        Just(TaskStatus::OnHold),
        Just(TaskStatus::NotStarted),
        Just(TaskStatus::Complete),
    ]
}

/// Events of task `t1` at random minute offsets, possibly out of order.
fn events_strategy() -> impl Strategy<Value = Vec<TaskHistoryEvent>> {
    prop::collection::vec(
        (0i64..600, phase_strategy(), status_strategy(), 0usize..3),
        0..24,
    )
    .prop_map(|raw| {
        let base = dt("2024-01-02T09:00:00+09:00");
        let events = raw
            .into_iter()
            .enumerate()
            .map(|(i, (minutes, phase, status, account))| {
                TaskHistoryEvent::new(
                    "p1",
                    "t1",
                    &format!("h{i}"),
                    base + Duration::minutes(minutes),
                    phase,
                    status,
                    Some(["A", "B", "C"][account]),
                )
            })
            .collect();
        received(events)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_span_durations_are_never_negative(events in events_strategy()) {
        let report = build_spans(&events, None);
        for span in report.spans() {
            prop_assert!(span.duration_hours >= 0.0);
            prop_assert!(span.end_event.created_datetime >= span.start_event.created_datetime);
        }
    }

    #[test]
    fn prop_proportional_credits_sum_to_one(events in events_strategy()) {
        let spans = build_spans(&events, None);
        let tasks = vec![task("t1", Phase::Acceptance, TaskStatus::Complete)];
        let (attributions, _) = attribute_tasks(
            &tasks,
            &spans,
            &[],
            &ProductionOverrides::default(),
            CompletionCriteria::AcceptanceCompleted,
        );

        let a = &attributions[0];
        for phase in Phase::ALL {
            let credits = a.credits(phase, AttributionPolicy::Proportional);
            if a.phases.get(phase).worktime_hour > 0.0 {
                let total: f64 = credits.iter().map(|(_, w)| w).sum();
                prop_assert!((total - 1.0).abs() < 1e-9, "{phase:?} credits sum to {total}");
            } else {
                prop_assert!(credits.is_empty());
            }
        }
    }

    #[test]
    fn prop_ratio_over_zero_is_none(numerator in -1e6f64..1e6) {
        prop_assert_eq!(ratio(numerator, 0.0), None);
    }

    #[test]
    fn prop_quartiles_are_ordered(values in prop::collection::vec(-1e3f64..1e3, 1..40)) {
        let (q1, q2, q3) = quartiles(&values).expect("non-empty population");
        prop_assert!(q1 <= q2 && q2 <= q3);
    }

    #[test]
    fn prop_moving_average_stays_within_observed_range(
        values in prop::collection::vec(prop::option::of(0.0f64..100.0), 1..30),
        window in 1u32..10,
    ) {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let series: Vec<(NaiveDate, Option<f64>)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), *v))
            .collect();

        for average in trailing_mean(&series, window).into_iter().flatten() {
            prop_assert!((-1e-9..=100.0 + 1e-9).contains(&average));
        }
    }
}
