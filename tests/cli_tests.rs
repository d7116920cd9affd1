mod common;
use common::{annoprod, write_project};
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn production_writes_all_tables() {
    let tmp = tempdir().expect("tempdir");
    let project = write_project(tmp.path(), "proj");
    let out = tmp.path().join("out");
    let cfg = tmp.path().join("none.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .arg("production")
        .arg(&project)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Production"))
        .stdout(predicate::str::contains("open_span"));

    for file in [
        "daily_production.csv",
        "member_production.csv",
        "member_daily_production.csv",
        "whole_production.csv",
        "task_attribution.csv",
        "warnings.json",
    ] {
        assert!(out.join(file).is_file(), "{file} missing");
    }

    let daily = fs::read_to_string(out.join("daily_production.csv")).expect("daily");
    let header = daily.lines().next().expect("header");
    assert!(header.starts_with("date,monitored_worktime_hour,"));
    assert!(header.contains("monitored_annotation_worktime_hour/annotation_count__moving_average"));
    assert!(daily.contains("2024-01-05"));

    let members = fs::read_to_string(out.join("member_production.csv")).expect("members");
    assert!(members.contains("Alice"));

    let warnings = fs::read_to_string(out.join("warnings.json")).expect("warnings");
    assert!(warnings.contains("\"kind\": \"open_span\""));
}

#[test]
fn existing_outputs_need_force() {
    let tmp = tempdir().expect("tempdir");
    let project = write_project(tmp.path(), "proj");
    let out = tmp.path().join("out");
    let cfg = tmp.path().join("none.yaml");

    let run = |force: bool| {
        let mut cmd = annoprod();
        cmd.arg("--config")
            .arg(&cfg)
            .arg("production")
            .arg(&project)
            .arg("-o")
            .arg(&out);
        if force {
            cmd.arg("--force");
        }
        cmd.assert()
    };

    run(false).success();
    run(false)
        .failure()
        .stderr(predicate::str::contains("already exists"));
    run(true).success();
}

#[test]
fn json_format_writes_one_document() {
    let tmp = tempdir().expect("tempdir");
    let project = write_project(tmp.path(), "proj");
    let out = tmp.path().join("out");
    let cfg = tmp.path().join("none.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .args(["production", "--format", "json", "--policy", "first_actor", "-o"])
        .arg(&out)
        .arg(&project)
        .assert()
        .success();

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("production.json")).expect("read"))
            .expect("json");
    assert_eq!(doc["project_id"], "p1");
    assert!(doc["daily_production"].is_array());
    assert!(doc["whole_production"][0]["monitored_worktime_hour"].is_number());
}

#[test]
fn rating_pools_several_projects() {
    let tmp = tempdir().expect("tempdir");
    let first = write_project(tmp.path(), "first");
    let second = write_project(tmp.path(), "second");
    let out = tmp.path().join("rating");
    let cfg = tmp.path().join("none.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .arg("rating")
        .arg(&first)
        .arg(&second)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "annotation_worktime_hour/annotation_count",
        ));

    let rating = fs::read_to_string(out.join("rating.csv")).expect("rating");
    assert!(rating.starts_with("project_id,subject_id,username,metric_name,raw_value,deviation_score,rank"));
    assert!(out.join("rating_summary.csv").is_file());

    let members = fs::read_to_string(out.join("member_production.csv")).expect("members");
    assert!(members.starts_with("project_id,account_id,"));
}

#[test]
fn spans_lists_closed_and_open_spans() {
    let tmp = tempdir().expect("tempdir");
    let project = write_project(tmp.path(), "proj");
    let out = tmp.path().join("spans");
    let cfg = tmp.path().join("none.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .arg("spans")
        .arg(&project)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 spans"))
        .stdout(predicate::str::contains("1 open"));

    let spans = fs::read_to_string(out.join("spans.csv")).expect("spans");
    assert_eq!(spans.lines().count(), 5);
    assert!(spans.lines().any(|l| l.starts_with("t2,") && l.ends_with(",true")));
}

#[test]
fn missing_project_file_fails() {
    let tmp = tempdir().expect("tempdir");
    let cfg = tmp.path().join("none.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .arg("production")
        .arg(tmp.path())
        .arg("-o")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file"));
}

#[test]
fn config_init_and_print() {
    let tmp = tempdir().expect("tempdir");
    let cfg = tmp.path().join("annoprod.yaml");

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "--init"])
        .assert()
        .success();
    assert!(cfg.is_file());

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "--init"])
        .assert()
        .failure();

    annoprod()
        .arg("--config")
        .arg(&cfg)
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task_completion_criteria: acceptance_completed"))
        .stdout(predicate::str::contains("moving_average_days: 7"));
}

#[test]
fn invalid_criteria_is_rejected_by_the_parser() {
    annoprod()
        .args(["production", "x", "-o", "y", "--criteria", "whenever"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("whenever"));
}
