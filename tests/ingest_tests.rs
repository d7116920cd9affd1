mod common;
use annoprod::config::Config;
use annoprod::core::warnings::Warning;
use annoprod::errors::AppError;
use annoprod::ingest::ledger::read_labor;
use annoprod::ingest::payload::{read_events, read_tasks};
use annoprod::ingest::{ExternalSources, load_project};
use annoprod::models::{CommentStatus, MetadataValue, Phase, TaskStatus};
use common::{date, event_json, task_json, write_json, write_project};
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[test]
fn project_directory_is_loaded_with_optional_files() {
    let tmp = tempdir().expect("tempdir");
    let dir = write_project(tmp.path(), "proj");

    let input = load_project(&dir, &ExternalSources::default()).expect("load");

    assert_eq!(input.project_id, "p1");
    assert_eq!(input.tasks.len(), 2);
    assert_eq!(input.events.len(), 7);
    assert_eq!(input.comments.len(), 1);
    assert_eq!(input.comments[0].status, CommentStatus::Resolved);
    assert_eq!(input.members.len(), 2);
    assert!(input.ingest_warnings.is_empty());

    let t1 = &input.tasks[0];
    assert_eq!(t1.phase, Phase::Acceptance);
    assert_eq!(t1.status, TaskStatus::Complete);
    assert_eq!(t1.input_data_count, 2);
    assert_eq!(t1.annotation_count, 20);
    assert_eq!(
        t1.metadata.get("batch"),
        Some(&MetadataValue::Text("b1".to_string()))
    );

    let indices: Vec<usize> = input.events.iter().map(|e| e.received_index).collect();
    assert_eq!(indices, (0..7).collect::<Vec<_>>());
}

#[test]
fn missing_required_file_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("empty");
    fs::create_dir_all(&dir).expect("mkdir");
    write_json(&dir.join("task.json"), &json!([]));

    let err = load_project(&dir, &ExternalSources::default()).expect_err("missing events");

    match err {
        AppError::MissingInput(path) => assert!(path.ends_with("task_history_event.json")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_enum_values_are_quarantined() {
    let tmp = tempdir().expect("tempdir");
    let events = tmp.path().join("events.json");
    write_json(
        &events,
        &json!([
            event_json("t1", "h1", "2024-01-01T09:00:00+09:00", "annotation", "working", "A"),
            event_json("t1", "h2", "2024-01-01T10:00:00+09:00", "annotation", "paused", "A"),
            event_json("t1", "h3", "not a date", "annotation", "break", "A"),
            event_json("t1", "h4", "2024-01-01T11:00:00+09:00", "annotation", "break", "A"),
        ]),
    );

    let decoded = read_events(&events).expect("decode");

    let ids: Vec<&str> = decoded
        .records
        .iter()
        .map(|e| e.task_history_id.as_str())
        .collect();
    assert_eq!(ids, ["h1", "h4"]);
    assert_eq!(decoded.records[1].received_index, 3);
    assert_eq!(decoded.warnings.len(), 2);
    assert!(matches!(
        &decoded.warnings[0],
        Warning::UnrecognizedValue { field, value, .. } if field == "status" && value == "paused"
    ));
}

#[test]
fn unknown_task_phase_is_quarantined() {
    let tmp = tempdir().expect("tempdir");
    let tasks = tmp.path().join("task.json");
    write_json(
        &tasks,
        &json!([
            task_json("t1", "annotation", "working"),
            task_json("t2", "review", "working"),
        ]),
    );

    let decoded = read_tasks(&tasks).expect("decode");

    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.warnings.len(), 1);
}

#[test]
fn invalid_json_is_an_error() {
    let tmp = tempdir().expect("tempdir");
    let tasks = tmp.path().join("task.json");
    fs::write(&tasks, "{ not json").expect("write");

    assert!(matches!(read_tasks(&tasks), Err(AppError::Json(_))));
}

#[test]
fn csv_tables_are_filtered_by_project() {
    let tmp = tempdir().expect("tempdir");
    let dir = write_project(tmp.path(), "proj");
    let labor = tmp.path().join("labor.csv");
    fs::write(
        &labor,
        "date,account_id,actual_worktime_hour,project_id\n\
         2024-01-02,A,2.0,p1\n\
         2024-01-02,A,5.0,p2\n\
         2024-01-03,B,1.5,\n",
    )
    .expect("write labor");
    let annotation = tmp.path().join("annotation_count.csv");
    fs::write(
        &annotation,
        "project_id,task_id,annotation_count\np1,t1,55\np2,t1,99\n",
    )
    .expect("write overrides");
    let custom = tmp.path().join("custom.csv");
    fs::write(&custom, "task_id,segment_count,frame_count\nt1,3,120\n").expect("write custom");

    let sources = ExternalSources {
        labor: Some(labor),
        annotation_count: Some(annotation),
        custom_volume: Some(custom),
        ..ExternalSources::default()
    };
    let input = load_project(&dir, &sources).expect("load");

    assert_eq!(input.labor.len(), 2);
    assert_eq!(input.overrides.annotation_count.get("t1"), Some(&55.0));
    assert_eq!(
        input.overrides.custom.columns,
        ["segment_count", "frame_count"]
    );
    assert_eq!(
        input.overrides.custom.get("t1"),
        vec![
            ("segment_count".to_string(), 3.0),
            ("frame_count".to_string(), 120.0)
        ]
    );
}

#[test]
fn bad_number_in_csv_names_the_column() {
    let tmp = tempdir().expect("tempdir");
    let dir = write_project(tmp.path(), "proj");
    let annotation = tmp.path().join("annotation_count.csv");
    fs::write(&annotation, "task_id,annotation_count\nt1,lots\n").expect("write overrides");

    let sources = ExternalSources {
        annotation_count: Some(annotation),
        ..ExternalSources::default()
    };

    match load_project(&dir, &sources) {
        Err(AppError::InvalidNumber { column, value }) => {
            assert_eq!(column, "annotation_count");
            assert_eq!(value, "lots");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn labor_ledger_without_project_column() {
    let tmp = tempdir().expect("tempdir");
    let labor = tmp.path().join("labor.csv");
    fs::write(
        &labor,
        "date, account_id, actual_worktime_hour\n2024-01-02, A, 7.5\n2024-01-03,B,2\n",
    )
    .expect("write labor");

    let entries = read_labor(&labor, Some("p1")).expect("read labor");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].date, date("2024-01-02"));
    assert_eq!(entries[0].account_id, "A");
    assert_eq!(entries[0].actual_worktime_hour, 7.5);
    assert!(entries.iter().all(|e| e.project_id.is_empty()));
}

#[test]
fn malformed_labor_row_is_a_csv_error() {
    let tmp = tempdir().expect("tempdir");
    let labor = tmp.path().join("labor.csv");
    fs::write(
        &labor,
        "date,account_id,actual_worktime_hour\n2024-01-02,A,lots\n",
    )
    .expect("write labor");

    assert!(matches!(read_labor(&labor, None), Err(AppError::Csv(_))));

    fs::write(
        &labor,
        "date,account_id,actual_worktime_hour\n02/01/2024,A,1\n",
    )
    .expect("write labor");

    assert!(matches!(read_labor(&labor, None), Err(AppError::Csv(_))));
}

#[test]
fn config_file_round_trips_and_fills_defaults() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("cfg").join("annoprod.yaml");

    assert_eq!(Config::load(Some(&path)).expect("defaults"), Config::default());

    Config::write_default(&path, false).expect("write");
    assert!(Config::write_default(&path, false).is_err());
    Config::write_default(&path, true).expect("overwrite");
    assert_eq!(Config::load(Some(&path)).expect("load"), Config::default());

    fs::write(
        &path,
        "attribution_policy: first_actor\nmoving_average_days: 3\ntask_filter:\n  phases: [acceptance]\nrating:\n  deviation:\n    scale: 15\n",
    )
    .expect("write partial");
    let cfg = Config::load(Some(&path)).expect("partial");
    assert_eq!(cfg.moving_average_days, 3);
    assert_eq!(cfg.parallelism, 4);
    assert_eq!(cfg.task_filter.phases, vec![Phase::Acceptance]);
    assert_eq!(cfg.rating.deviation.scale, 15.0);
    assert_eq!(cfg.rating.deviation.base, 50.0);
    assert_eq!(cfg.rating.metrics.len(), 5);

    fs::write(&path, "moving_average_days: 0\n").expect("write invalid");
    assert!(matches!(Config::load(Some(&path)), Err(AppError::Config(_))));
}
