use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn castdiff(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_castdiff"));
    command.args(args).env_remove("RUST_LOG");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().expect("castdiff binary should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn small_log_dir(dir: &Path) {
    fs::write(
        dir.join("t_original.json"),
        r#"{"3": {"value": "-1", "type": "INT", "valid": true},
            "4": {"value": "'x'", "type": "INT", "valid": false}}"#,
    )
    .unwrap();
    fs::write(dir.join("t_expected"), "3\t-1\n").unwrap();
    fs::write(dir.join("t_w_sql_orc"), "3\t-1\n4\tNULL\n").unwrap();
    fs::write(dir.join("t_w_sql_r_sql_orc"), "3\t-1\n4\tNULL\n").unwrap();
    fs::write(dir.join("t_w_sql_r_df_orc"), "3 |-1|\n").unwrap();
}

#[test]
fn analyze_prints_failure_tally_and_writes_reports() {
    let tmp = tempfile::tempdir().unwrap();
    small_log_dir(tmp.path());
    let dir = tmp.path().to_string_lossy().into_owned();

    let output = castdiff(&["analyze", &dir, "ss"], &[]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    // Row 4 is invalid: one interface showed null, the other nothing.
    assert!(text.starts_with("wr fails: 0\neh fails: 1\ndifft fails: 0 1\n"), "{text}");

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("ss_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["eh_fails"], 1);
    assert_eq!(summary["plan"], "ss");
    assert!(tmp.path().join("castdiff.log.jsonl").is_file());
}

#[test]
fn dry_run_matches_full_run() {
    let tmp = tempfile::tempdir().unwrap();
    small_log_dir(tmp.path());
    let dir = tmp.path().to_string_lossy().into_owned();

    let full = castdiff(&["analyze", &dir, "ss"], &[]);
    assert_eq!(full.status.code(), Some(0));
    let before = fs::read_to_string(tmp.path().join("ss_difft_all.json")).unwrap();

    let dry = castdiff(&["analyze", &dir, "ss", "--dry-run"], &[]);
    assert_eq!(dry.status.code(), Some(0), "stderr: {}", stderr(&dry));
    assert_eq!(stdout(&dry), stdout(&full));
    let after = fs::read_to_string(tmp.path().join("ss_difft_all.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn missing_ground_truth_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_string_lossy().into_owned();
    let output = castdiff(&["analyze", &dir, "hs"], &[]);
    assert_eq!(output.status.code(), Some(4));
    let text = stderr(&output);
    assert!(text.contains("ground truth not found"), "{text}");
    assert!(text.contains("hint: Run `castdiff generate`"), "{text}");
}

#[test]
fn invalid_scan_window_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    small_log_dir(tmp.path());
    let dir = tmp.path().to_string_lossy().into_owned();
    let output = castdiff(&["analyze", &dir, "ss"], &[("CASTDIFF_SCAN_WINDOW", "1")]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("CASTDIFF_SCAN_WINDOW"));
}

#[test]
fn unknown_plan_is_a_usage_error() {
    let output = castdiff(&["analyze", "logs", "xx"], &[]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Usage: castdiff"));
}

#[test]
fn generate_then_analyze_empty_run() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_string_lossy().into_owned();

    let generated = castdiff(&["generate", &dir, "hive", "spark", "--one-way"], &[]);
    assert_eq!(generated.status.code(), Some(0), "stderr: {}", stderr(&generated));
    assert!(tmp.path().join("hs_bindings.json").is_file());

    // No table dumps yet: nothing to judge, nothing fails.
    let analyzed = castdiff(&["analyze", &dir, "hs"], &[]);
    assert_eq!(analyzed.status.code(), Some(0), "stderr: {}", stderr(&analyzed));
    assert!(stdout(&analyzed).starts_with("wr fails: 0\neh fails: 0\ndifft fails: 0 0\n"));
}

#[test]
fn missing_log_dir_is_not_created() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("no_such_run");
    let dir = missing.to_string_lossy().into_owned();
    let output = castdiff(&["analyze", &dir, "ss"], &[]);
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("ground truth not found"));
    assert!(!missing.exists(), "analyze created {}", missing.display());
}

#[test]
fn aborted_analysis_is_classified_in_run_log() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("t_original.json"), "not json").unwrap();
    fs::write(tmp.path().join("t_expected"), "").unwrap();
    let dir = tmp.path().to_string_lossy().into_owned();

    let output = castdiff(&["analyze", &dir, "ss"], &[]);
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));
    let log = fs::read_to_string(tmp.path().join("castdiff.log.jsonl")).unwrap();
    let aborted = log
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["fields"]["message"] == "analysis aborted")
        .expect("abort event logged");
    assert_eq!(aborted["fields"]["fatal"], true);
    assert_eq!(aborted["fields"]["recoverable"], false);
}
