//! Integration tests for the bbt CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "timestamp,machine_id,operator,test_id,axis,angle_deg,radius_nominal_mm,radius_measured_mm,deviation_mm";

/// Helper to get a bbt command with a clean environment
fn bbt() -> Command {
    let mut cmd = Command::cargo_bin("bbt").unwrap();
    cmd.env_remove("BBT_MACHINE")
        .env_remove("BBT_OPERATOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    bbt().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to collect one sample measurement with a fixed test id
fn collect(tmp: &TempDir, machine: &str, test_id: &str) {
    bbt()
        .current_dir(tmp.path())
        .args(["collect", "--machine", machine, "--test-id", test_id])
        .assert()
        .success();
}

fn write_table(path: &Path, rows: &[&str]) {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    bbt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Collects CNC ballbar measurements"));
}

#[test]
fn test_short_help_displays_about() {
    bbt()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ballbar calibration toolkit"));
}

#[test]
fn test_version_displays() {
    bbt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bbt"));
}

#[test]
fn test_unknown_command_fails() {
    bbt()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    bbt()
        .current_dir(tmp.path())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bbt init"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    bbt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".bbt/config.yaml").exists());
    for dir in ["raw", "processed", "meta", "analysis", "reports", "plots"] {
        assert!(tmp.path().join("data").join(dir).is_dir(), "data/{} missing", dir);
    }
    let template = fs::read_to_string(tmp.path().join("data/processed/ballbar_template.csv")).unwrap();
    assert_eq!(template.trim_end(), HEADER);
}

#[test]
fn test_init_reports_existing_project() {
    let tmp = setup_test_project();

    bbt()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_keeps_config() {
    let tmp = setup_test_project();
    let config = tmp.path().join(".bbt/config.yaml");
    fs::write(&config, "machine_id: MILL_7\n").unwrap();

    bbt()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&config).unwrap(), "machine_id: MILL_7\n");
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_bare_invocation_runs_pipeline_in_fresh_directory() {
    let tmp = TempDir::new().unwrap();

    bbt()
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0 OK, 3 MEDIUM, 0 HIGH"));

    let data = tmp.path().join("data");
    assert!(tmp.path().join(".bbt").is_dir());
    assert!(data.join("meta/tests_metadata.json").exists());
    for file in [
        "analysis/all_measurements.csv",
        "analysis/deviation_stats.csv",
        "analysis/all_measurements_with_classes.csv",
        "analysis/error_class_counts.csv",
        "analysis/error_classes_by_machine.csv",
        "plots/deviation_summary.svg",
        "plots/error_classes_by_machine.svg",
        "reports/ballbar_error_report.html",
    ] {
        assert!(data.join(file).exists(), "{} missing", file);
    }

    let raw: Vec<_> = fs::read_dir(data.join("raw")).unwrap().collect();
    assert_eq!(raw.len(), 1);

    let dump = fs::read_to_string(data.join("analysis/all_measurements.csv")).unwrap();
    let mut lines = dump.lines();
    assert_eq!(lines.next().unwrap(), format!("{},source_file", HEADER));
    assert!(lines.next().unwrap().ends_with(".csv"));
}

#[test]
fn test_run_uses_configured_machine() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".bbt/config.yaml"), "machine_id: MILL_7\n").unwrap();

    bbt().current_dir(tmp.path()).arg("run").assert().success();

    let stats = fs::read_to_string(tmp.path().join("data/analysis/deviation_stats.csv")).unwrap();
    assert!(stats.contains("MILL_7,XY,"));
}

#[test]
fn test_run_machine_from_environment() {
    let tmp = setup_test_project();

    bbt()
        .current_dir(tmp.path())
        .env("BBT_MACHINE", "LATHE_2")
        .arg("run")
        .assert()
        .success();

    let registry = fs::read_to_string(tmp.path().join("data/meta/tests_metadata.json")).unwrap();
    assert!(registry.contains("\"machine_id\": \"LATHE_2\""));
}

#[test]
fn test_report_html_contains_sections() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .args(["report", "--path-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ballbar_error_report.html"));

    let html =
        fs::read_to_string(tmp.path().join("data/reports/ballbar_error_report.html")).unwrap();
    assert!(html.contains("CNC_01"));
    assert!(html.contains("MEDIUM"));
    assert!(html.contains("error_classes_by_machine.svg"));
}

#[test]
fn test_report_without_measurements_fails() {
    let tmp = setup_test_project();
    bbt()
        .current_dir(tmp.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record files"));
}

// ============================================================================
// Collect / Registry Tests
// ============================================================================

#[test]
fn test_collect_writes_record_file_and_registers() {
    let tmp = setup_test_project();

    bbt()
        .current_dir(tmp.path())
        .args(["collect", "--machine", "CNC_02", "--test-id", "T1", "-d", "after repair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_02_T1"));

    let table = fs::read_to_string(tmp.path().join("data/raw/CNC_02_T1.csv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(lines.len(), 4);
    assert!(tmp.path().join("data/plots/CNC_02_T1_control_chart.svg").exists());

    bbt()
        .current_dir(tmp.path())
        .args(["registry", "show", "CNC_02_T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("after repair"));
}

#[test]
fn test_collect_test_id_cannot_escape_raw_dir() {
    let tmp = setup_test_project();

    bbt()
        .current_dir(tmp.path())
        .args(["collect", "--test-id", "../../escape", "--no-register"])
        .assert()
        .success();

    assert!(!tmp.path().join("escape.csv").exists());
    assert!(tmp.path().join("data/raw/CNC_01_.._.._escape.csv").exists());
}

#[test]
fn test_collect_no_register() {
    let tmp = setup_test_project();

    bbt()
        .current_dir(tmp.path())
        .args(["collect", "--test-id", "T1", "--no-register"])
        .assert()
        .success();

    assert!(!tmp.path().join("data/meta/tests_metadata.json").exists());
    bbt()
        .current_dir(tmp.path())
        .args(["registry", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No tests registered"));
}

#[test]
fn test_registry_list_keeps_order_and_filters() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_02", "A");
    collect(&tmp, "CNC_01", "B");

    let output = bbt()
        .current_dir(tmp.path())
        .args(["registry", "list", "-f", "csv"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let second = stdout.find("CNC_02_A").unwrap();
    let first = stdout.find("CNC_01_B").unwrap();
    assert!(second < first);

    bbt()
        .current_dir(tmp.path())
        .args(["registry", "list", "--machine", "CNC_01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_01_B"))
        .stdout(predicate::str::contains("CNC_02_A").not());
}

#[test]
fn test_registry_show_unknown_fails() {
    let tmp = setup_test_project();
    bbt()
        .current_dir(tmp.path())
        .args(["registry", "show", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOPE"));
}

// ============================================================================
// Stats / Classify / Feedrate Tests
// ============================================================================

#[test]
fn test_stats_table() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("deviation_mean_mm"))
        .stdout(predicate::str::contains("-0.0100"))
        .stdout(predicate::str::contains("| 3"));
}

#[test]
fn test_stats_json_and_output_file() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");
    let out = tmp.path().join("stats.json");

    bbt()
        .current_dir(tmp.path())
        .args(["stats", "-f", "json", "-o"])
        .arg(&out)
        .assert()
        .success();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed[0]["machine_id"], "CNC_01");
    assert_eq!(parsed[0]["n_points"], 3);
}

#[test]
fn test_classify_with_threshold_override() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .args(["classify", "--small-dev", "0.025", "--counts", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_01,XY,OK,2"))
        .stdout(predicate::str::contains("CNC_01,XY,MEDIUM,1"));
}

#[test]
fn test_classify_filter_class() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .args(["classify", "--small-dev", "0.001", "--medium-dev", "0.025", "--class", "high", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(",180,").and(predicate::str::contains(",0,").not()));
}

#[test]
fn test_classify_high_summary() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    // all three sample deviations exceed 0.015
    bbt()
        .current_dir(tmp.path())
        .args(["classify", "--small-dev", "0.001", "--medium-dev", "0.015", "--class", "high", "--summary", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("machine_id,axis,n_points,mean_dev_mm"))
        .stdout(predicate::str::contains("CNC_01,XY,3,-0.0100"));
}

#[test]
fn test_classify_rejects_inverted_thresholds() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .args(["classify", "--small-dev", "0.05", "--medium-dev", "0.01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn test_feedrate_advice() {
    let tmp = setup_test_project();
    collect(&tmp, "CNC_01", "T1");

    bbt()
        .current_dir(tmp.path())
        .args(["feedrate", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_01,-0.0100,ok"));

    bbt()
        .current_dir(tmp.path())
        .args(["feedrate", "--max-dev", "0.005", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reduce feedrate"));
}

// ============================================================================
// Compare Tests
// ============================================================================

#[test]
fn test_compare_pre_post_tables() {
    let tmp = setup_test_project();
    let pre = tmp.path().join("pre.csv");
    let post = tmp.path().join("post.csv");
    write_table(
        &pre,
        &[
            "2024-01-01T10:00:00,CNC_01,op,PRE,XY,0,150.0,149.98,-0.02",
            "2024-01-01T10:00:00,CNC_01,op,PRE,XY,90,150.0,150.02,0.02",
        ],
    );
    write_table(
        &post,
        &[
            "2024-01-02T10:00:00,CNC_01,op,POST,XY,0,150.0,149.99,-0.01",
            "2024-01-02T10:00:00,CNC_01,op,POST,XY,90,150.0,150.0,0.0",
            "2024-01-02T10:00:00,CNC_01,op,POST,XY,180,150.0,150.0,0.0",
        ],
    );

    bbt()
        .current_dir(tmp.path())
        .args(["compare", "pre.csv", "post.csv", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_01,-0.0050,2"));

    let rows =
        fs::read_to_string(tmp.path().join("data/analysis/pre_post_comparison.csv")).unwrap();
    assert_eq!(rows.lines().count(), 3);
    assert!(rows.lines().next().unwrap().contains("delta_dev_mm"));
    assert!(tmp.path().join("data/plots/post_calib_delta.svg").exists());
}

#[test]
fn test_compare_strict_rejects_duplicate_keys() {
    let tmp = setup_test_project();
    let pre = tmp.path().join("pre.csv");
    let post = tmp.path().join("post.csv");
    write_table(
        &pre,
        &[
            "t,CNC_01,op,A,XY,0,150.0,149.98,-0.02",
            "t,CNC_01,op,B,XY,0,150.0,149.99,-0.01",
        ],
    );
    write_table(&post, &["t,CNC_01,op,C,XY,0,150.0,150.0,0.0"]);

    bbt()
        .current_dir(tmp.path())
        .args(["compare", "pre.csv", "post.csv", "--strict"])
        .assert()
        .failure();

    bbt()
        .current_dir(tmp.path())
        .args(["compare", "pre.csv", "post.csv", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CNC_01,0.0150,2"));
}

#[test]
fn test_compare_without_matches_keeps_headers() {
    let tmp = setup_test_project();
    write_table(&tmp.path().join("pre.csv"), &["t,CNC_01,op,A,XY,0,150.0,149.98,-0.02"]);
    write_table(&tmp.path().join("post.csv"), &["t,CNC_01,op,B,XY,90,150.0,150.02,0.02"]);

    bbt()
        .current_dir(tmp.path())
        .args(["compare", "pre.csv", "post.csv"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No matching"));

    let rows =
        fs::read_to_string(tmp.path().join("data/analysis/pre_post_comparison.csv")).unwrap();
    assert_eq!(rows.lines().count(), 1);
    assert!(rows.contains("delta_dev_mm"));
}

#[test]
fn test_compare_schema_mismatch() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("pre.csv"), "machine_id,axis\nCNC_01,XY\n").unwrap();
    write_table(&tmp.path().join("post.csv"), &[]);

    bbt()
        .current_dir(tmp.path())
        .args(["compare", "pre.csv", "post.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deviation_mm"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    bbt()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bbt"));
}
