use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_daterange-filter")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(bin())
        .args(args)
        .env_remove("DATERANGE_CONFIG")
        .env_remove("DATERANGE_TIMEZONE")
        .output()
        .expect("command should run")
}

#[test]
fn test_query_json_reports_bounds() {
    let output = run(&[
        "-F",
        "json",
        "query",
        "01/01/2024 - 31/01/2024",
        "--column",
        "created_at",
        "--table",
        "orders",
    ]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(
        report["sql"],
        r#"select * from "orders" where "created_at" between ? and ?"#
    );
    assert_eq!(
        report["bindings"],
        serde_json::json!(["2024-01-01 00:00:00", "2024-01-31 23:59:59"])
    );
    assert_eq!(report["predicate"]["column"], "created_at");
}

#[test]
fn test_query_without_value_is_unconstrained() {
    let output = run(&["-F", "json", "query"]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert!(report["predicate"].is_null());
    assert!(report["state"].is_null());
    assert_eq!(report["sql"], "select *");
}

#[test]
fn test_query_with_wrong_layout_fails() {
    let output = run(&["query", "2024-01-01 - 2024-01-31"]);

    assert!(!output.status.success(), "parse errors must not be swallowed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("d/m/Y"), "stderr: {stderr}");
}

#[test]
fn test_text_output_written_to_file() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("report.txt");

    let output = run(&[
        "--color",
        "never",
        "-o",
        out.to_str().expect("utf8 path"),
        "query",
        "2024-03-01 - 2024-03-02",
        "--format",
        "Y-m-d",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output.stdout.is_empty(), "report should go to the file only");

    let content = fs::read_to_string(&out).expect("output file should exist");
    assert!(content.contains("2024-03-02 23:59:59"));
    assert!(content.contains("01/03/2024 - 02/03/2024"));
}

#[test]
fn test_schema_uses_profile() {
    let dir = tempdir().expect("temp dir");
    let profile = dir.path().join("profile.toml");
    write_file(
        &profile,
        "[filter]\nname = \"shipped_at\"\n\n[picker]\nauto_apply = true\nfirst_day_of_week = 9\n",
    );

    let output = run(&[
        "-c",
        profile.to_str().expect("utf8 path"),
        "-F",
        "json",
        "schema",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).expect("JSON");
    assert_eq!(schema["name"], "shipped_at");
    assert_eq!(schema["label"], "Shipped at");
    assert_eq!(schema["autoApply"], true);
    assert_eq!(schema["firstDayOfWeek"], 1);
}

#[test]
fn test_profile_command_round_trips_through_toml() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("generated.toml");

    let output = run(&["-o", out.to_str().expect("utf8 path"), "profile"]);
    assert!(output.status.success());

    let profile = daterange_filter::load_config_from_path(&out).expect("generated profile loads");
    assert_eq!(profile.filter.name, "created_at");
    assert_eq!(profile.filter.format, "d/m/Y");
}
