//! CLI behavior tests: exit codes, report output, init.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn cukehtml_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cukehtml"))
}

#[test]
fn no_args_returns_error_not_panic() {
    let mut cmd = cukehtml_cmd();
    cmd.assert().failure().code(2);
}

#[test]
fn render_document_writes_report() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("report");

    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .arg("-o")
        .arg(&out)
        .arg("--no-color");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scenarios:   2 (1 passed, 1 failed)"))
        .stdout(predicate::str::contains("Attachments: 2"));

    assert!(out.join("index.html").is_file());
    assert!(out.join("js/app.js").is_file());
    assert!(out.join("embedded1.png").is_file());
    let report = fs::read_to_string(out.join("report.json")).unwrap();
    let _: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
    assert!(report.contains("\"embedded2.txt\""));
}

#[test]
fn render_events_quiet() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("events-report");

    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg("--events")
        .arg(fixture("checkout.ndjson"))
        .arg("--output")
        .arg(&out)
        .arg("--quiet")
        .arg("--no-color");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("passed (1/1 scenarios passed)"));
    assert!(out.join("embedded1.png").is_file());
}

#[test]
fn render_from_stdin() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("stdin-report");
    let document = fs::read_to_string(fixture("checkout.json")).unwrap();

    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .args(["render", "-", "-q", "--no-color", "-o"])
        .arg(&out)
        .write_stdin(document);
    cmd.assert().success();
    assert!(out.join("report.json").is_file());
}

#[test]
fn strict_fails_on_failed_scenario() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .arg("--strict")
        .arg("-q");
    cmd.assert().failure().code(1);
    // Report is still written
    assert!(tmp
        .path()
        .join("cucumber-html-report")
        .join("index.html")
        .is_file());
}

#[test]
fn pretty_flag_indents_report() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .args(["-o", "out", "--pretty", "-q"]);
    cmd.assert().success();
    let report = fs::read_to_string(tmp.path().join("out").join("report.json")).unwrap();
    assert!(report.starts_with("[\n  {"));
}

#[test]
fn input_not_found_exit_2() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .args(["render", "nonexistent.json"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("nonexistent.json"));
}

#[test]
fn invalid_document_exit_2() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("broken.json"), "{ not cucumber").unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path()).args(["render", "broken.json"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn output_under_file_exit_2() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blocker"), "file").unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .args(["-o", "blocker/report"]);
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error creating directory"));
}

#[test]
fn config_output_dir_is_used() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".cukehtmlrc.json"),
        r#"{ "outputDir": "from-config" }"#,
    )
    .unwrap();

    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .arg("-q");
    cmd.assert().success();
    assert!(tmp.path().join("from-config").join("report.json").is_file());
}

#[test]
fn custom_assets_replace_builtin() {
    let tmp = TempDir::new().unwrap();
    let skin = tmp.path().join("skin").join("css");
    fs::create_dir_all(&skin).unwrap();
    fs::write(skin.join("style.css"), "body { color: red; }").unwrap();

    let mut cmd = cukehtml_cmd();
    cmd.current_dir(tmp.path())
        .arg("render")
        .arg(fixture("checkout.json"))
        .args(["-o", "out", "--assets", "skin", "-q"]);
    cmd.assert().success();
    assert_eq!(
        fs::read_to_string(tmp.path().join("out/css/style.css")).unwrap(),
        "body { color: red; }"
    );
}

#[test]
fn assets_lists_manifest() {
    let mut cmd = cukehtml_cmd();
    cmd.arg("assets");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("index.html"))
        .stdout(predicate::str::contains("pages/feature.html"))
        .stdout(predicate::str::contains("img/loading.gif"));
}

#[test]
fn init_creates_config() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.arg("init").arg("--dir").arg(tmp.path());
    cmd.assert().success();
    let config_path = tmp.path().join(".cukehtmlrc.json");
    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("cucumber-html-report"));
}

#[test]
fn init_fails_if_config_exists() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".cukehtmlrc.json"), "{}").unwrap();
    let mut cmd = cukehtml_cmd();
    cmd.arg("init").arg("--dir").arg(tmp.path());
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("already exists"));
}
