mod common;
use annoprod::core::attribution::{
    AttributionPolicy, CompletionCriteria, attribute_tasks, phase_shares, production_date,
};
use annoprod::core::calculator::spans::build_spans;
use annoprod::core::filter::TaskFilter;
use annoprod::core::volume::{ProductionOverrides, apply_annotation_counts};
use annoprod::core::warnings::Warning;
use annoprod::models::{
    AnnotationCount, CommentStatus, CommentType, InspectionComment, MetadataValue, Phase::*,
    TaskStatus::*,
};
use common::{assert_close, date, ev, received, shared_task_events, task};
use std::collections::BTreeMap;

fn comment(task_id: &str, id: &str, status: CommentStatus, is_root: bool) -> InspectionComment {
    InspectionComment {
        project_id: "p1".to_string(),
        task_id: task_id.to_string(),
        comment_id: id.to_string(),
        phase: Inspection,
        phase_stage: 1,
        account_id: Some("C".to_string()),
        comment_type: CommentType::Inspection,
        status,
        is_root,
        created_datetime: None,
    }
}

#[test]
fn proportional_shares_follow_worktime() {
    let tasks = vec![task("t1", Acceptance, Complete)];
    let spans = build_spans(&received(shared_task_events("t1")), None);

    let (attributions, warnings) = attribute_tasks(
        &tasks,
        &spans,
        &[],
        &ProductionOverrides::default(),
        CompletionCriteria::AcceptanceCompleted,
    );

    assert!(warnings.is_empty());
    let a = &attributions[0];
    assert_eq!(a.production_date, Some(date("2024-01-05")));

    let credits: BTreeMap<String, f64> = a
        .credits(Annotation, AttributionPolicy::Proportional)
        .into_iter()
        .collect();
    assert_close(credits["A"], 0.75);
    assert_close(credits["B"], 0.25);
    assert_close(credits.values().sum(), 1.0);

    assert_eq!(
        a.credits(Annotation, AttributionPolicy::FirstActor),
        vec![("A".to_string(), 1.0)]
    );
}

#[test]
fn acceptance_reached_counts_once_and_drops_acceptance_worktime() {
    let events = received(vec![
        ev("t1", "h1", "2024-01-30T09:00:00+09:00", Annotation, Working, Some("A")),
        ev("t1", "h2", "2024-01-30T10:00:00+09:00", Annotation, Complete, Some("A")),
        ev("t1", "h3", "2024-02-01T09:00:00+09:00", Acceptance, Working, Some("D")),
        ev("t1", "h4", "2024-02-01T09:30:00+09:00", Acceptance, Complete, Some("D")),
        ev("t1", "h5", "2024-02-03T09:00:00+09:00", Annotation, Working, Some("A")),
        ev("t1", "h6", "2024-02-03T09:30:00+09:00", Annotation, Complete, Some("A")),
        ev("t1", "h7", "2024-02-10T09:00:00+09:00", Acceptance, Working, Some("D")),
        ev("t1", "h8", "2024-02-10T09:30:00+09:00", Acceptance, Complete, Some("D")),
    ]);
    let spans = build_spans(&events, None);
    let tasks = vec![task("t1", Acceptance, Complete)];

    let (attributions, _) = attribute_tasks(
        &tasks,
        &spans,
        &[],
        &ProductionOverrides::default(),
        CompletionCriteria::AcceptanceReached,
    );

    let a = &attributions[0];
    assert_eq!(a.production_date, Some(date("2024-02-01")));
    assert_eq!(a.rejected_count, 1);
    assert_close(a.production_worktime_hour(Acceptance), 0.0);
    assert!(a.credits(Acceptance, AttributionPolicy::Proportional).is_empty());
    assert_close(a.production_worktime_hour(Annotation), 1.5);

    let (completed, _) = attribute_tasks(
        &tasks,
        &spans,
        &[],
        &ProductionOverrides::default(),
        CompletionCriteria::AcceptanceCompleted,
    );
    assert_eq!(completed[0].production_date, Some(date("2024-02-01")));
    assert_close(completed[0].production_worktime_hour(Acceptance), 1.0);
}

#[test]
fn unfinished_task_has_no_production_date() {
    let events = received(vec![
        ev("t1", "h1", "2024-01-01T09:00:00+00:00", Annotation, Working, Some("A")),
        ev("t1", "h2", "2024-01-01T10:00:00+00:00", Annotation, Break, Some("A")),
    ]);
    let spans = build_spans(&events, None);
    let t = task("t1", Annotation, Break);

    assert_eq!(
        production_date(&t, spans.timelines.get("t1"), CompletionCriteria::AcceptanceCompleted),
        None
    );
}

#[test]
fn production_date_falls_back_to_task_timestamps() {
    let mut t = task("t1", Acceptance, Complete);
    t.first_acceptance_completed_datetime = Some(common::dt("2024-03-02T23:00:00+09:00"));

    assert_eq!(
        production_date(&t, None, CompletionCriteria::AcceptanceCompleted),
        Some(date("2024-03-02"))
    );
    assert_eq!(
        production_date(&t, None, CompletionCriteria::AcceptanceReached),
        None
    );
}

#[test]
fn span_without_account_blocks_phase_credit() {
    let events = received(vec![
        ev("t1", "h1", "2024-01-01T09:00:00+00:00", Annotation, Working, Some("A")),
        ev("t1", "h2", "2024-01-01T10:00:00+00:00", Annotation, Break, Some("A")),
        ev("t1", "h3", "2024-01-01T11:00:00+00:00", Annotation, Working, None),
        ev("t1", "h4", "2024-01-01T11:30:00+00:00", Annotation, Break, None),
    ]);
    let spans = build_spans(&events, None);
    let timeline = &spans.timelines["t1"];

    let (shares, warning) = phase_shares("t1", Annotation, timeline.phase_spans(Annotation));

    assert!(shares.is_empty());
    assert!(matches!(warning, Some(Warning::AttributionGap { phase: Annotation, .. })));
}

#[test]
fn zero_length_spans_raise_zero_worktime_warning() {
    let events = received(vec![
        ev("t1", "h1", "2024-01-01T09:00:00+00:00", Annotation, Working, Some("A")),
        ev("t1", "h2", "2024-01-01T09:00:00+00:00", Annotation, Break, Some("A")),
    ]);
    let spans = build_spans(&events, None);

    let (shares, warning) =
        phase_shares("t1", Annotation, spans.timelines["t1"].phase_spans(Annotation));

    assert!(shares.is_empty());
    assert!(matches!(warning, Some(Warning::ZeroWorktimePhase { .. })));
}

#[test]
fn only_resolved_root_inspection_comments_are_pointed_out() {
    let tasks = vec![task("t1", Acceptance, Complete)];
    let spans = build_spans(&received(shared_task_events("t1")), None);
    let comments = vec![
        comment("t1", "c1", CommentStatus::Resolved, true),
        comment("t1", "c2", CommentStatus::Resolved, false),
        comment("t1", "c3", CommentStatus::Closed, true),
        comment("t1", "c4", CommentStatus::Open, true),
        comment("t2", "c5", CommentStatus::Resolved, true),
    ];

    let (attributions, _) = attribute_tasks(
        &tasks,
        &spans,
        &comments,
        &ProductionOverrides::default(),
        CompletionCriteria::AcceptanceCompleted,
    );

    assert_eq!(attributions[0].pointed_out_inspection_comment_count, 1);
}

#[test]
fn overrides_replace_task_counts() {
    let tasks = vec![task("t1", Acceptance, Complete)];
    let spans = build_spans(&received(shared_task_events("t1")), None);
    let mut overrides = ProductionOverrides::default();
    overrides.annotation_count.insert("t1".to_string(), 42.0);
    overrides.custom.columns = vec!["segment_count".to_string()];
    overrides
        .custom
        .values
        .insert("t1".to_string(), vec![7.0]);

    let (attributions, _) = attribute_tasks(
        &tasks,
        &spans,
        &[],
        &overrides,
        CompletionCriteria::AcceptanceCompleted,
    );

    let volume = &attributions[0].volume;
    assert_close(volume.task_count, 1.0);
    assert_close(volume.annotation_count, 42.0);
    assert_close(volume.input_data_count, 1.0);
    assert_close(volume.custom_value("segment_count"), 7.0);
}

#[test]
fn annotation_counts_can_be_restricted_to_labels() {
    let tasks = vec![task("t1", Acceptance, Complete), task("t2", Annotation, Working)];
    let counts = vec![
        AnnotationCount {
            task_id: "t1".to_string(),
            label_counts: [("car".to_string(), 3), ("person".to_string(), 4)]
                .into_iter()
                .collect(),
            ..AnnotationCount::default()
        },
        AnnotationCount {
            task_id: "t1".to_string(),
            label_counts: [("car".to_string(), 2)].into_iter().collect(),
            ..AnnotationCount::default()
        },
    ];

    let all = apply_annotation_counts(&tasks, &counts, &[]);
    assert_eq!(all[0].annotation_count, 9);
    assert_eq!(all[1].annotation_count, 10);

    let cars = apply_annotation_counts(&tasks, &counts, &["car".to_string()]);
    assert_eq!(cars[0].annotation_count, 5);
}

#[test]
fn task_filter_matches_metadata_phase_and_status() {
    let mut t1 = task("t1", Acceptance, Complete);
    t1.metadata
        .insert("batch", MetadataValue::Text("b1".to_string()));
    t1.metadata.insert("priority", MetadataValue::Number(3.0));
    let mut t2 = task("t2", Annotation, Working);
    t2.metadata
        .insert("batch", MetadataValue::Text("b2".to_string()));

    let mut filter = TaskFilter::default();
    assert!(filter.is_empty());
    assert_eq!(filter.apply(&[t1.clone(), t2.clone()]).len(), 2);

    filter
        .metadata
        .insert("priority".to_string(), "3".to_string());
    let kept = filter.apply(&[t1.clone(), t2.clone()]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].task_id, "t1");

    let by_status = TaskFilter {
        statuses: vec![Working],
        ..TaskFilter::default()
    };
    assert_eq!(by_status.apply(&[t1, t2])[0].task_id, "t2");
}
