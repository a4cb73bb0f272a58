//! CLI tests for the `clui` binary.

use std::path::Path;
use std::process::{Command, Output};

use assert_cmd::cargo;
use tempfile::TempDir;

const GRAMMAR: &str = r#"{
    "seed": {
        "description": "Seed the database",
        "args": {
            "count": { "type": "integer" },
            "force": { "flag": true }
        }
    },
    "deploy": { "commands": "targets.json" }
}"#;

const TARGETS: &str = r#"{
    "staging": { "args": { "tag": {} } },
    "stable": {},
    "prod": {}
}"#;

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("grammar.json"), GRAMMAR).expect("write grammar");
    std::fs::write(dir.path().join("targets.json"), TARGETS).expect("write targets");
    dir
}

fn clui_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("clui"));
    cmd.env("CLUI_GRAMMAR", dir.join("grammar.json"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> (Output, serde_json::Value) {
    let output = clui_cmd(dir)
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run clui");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid json ({e}): {stdout}"));
    (output, json)
}

// ─── parse / find / args ─────────────────────────────────────────────────────

#[test]
fn parse_prints_ast_and_diagnostics() {
    let dir = fixture();
    let (output, json) = run_json(dir.path(), &["parse", "seed --count 3 extra"]);
    assert!(output.status.success());
    assert_eq!(json["ast"]["command"]["kind"], "COMMAND");
    assert_eq!(json["ast"]["remainder"]["token"]["value"], "extra");
    assert_eq!(json["diagnostics"][0]["id"], "CLUI2001");
}

#[test]
fn find_reports_node_at_index() {
    let dir = fixture();
    let (_, json) = run_json(dir.path(), &["find", "seed --count 3", "--index", "7"]);
    assert_eq!(json["kind"], "ARG_KEY");
    assert_eq!(json["name"], "count");
    assert_eq!(json["token"]["start"], 5);

    let (_, json) = run_json(dir.path(), &["find", "seed  ", "--index", "5"]);
    assert!(json.is_null());

    let (_, json) = run_json(
        dir.path(),
        &["find", "seed  ", "--index", "6", "--previous"],
    );
    assert_eq!(json["kind"], "COMMAND");
}

#[test]
fn args_reports_parsed_and_remaining() {
    let dir = fixture();
    let (_, json) = run_json(dir.path(), &["args", "seed --count 3"]);
    assert_eq!(json["path"], serde_json::json!(["seed"]));
    assert_eq!(json["args"]["parsed"]["count"], 3);
    assert_eq!(json["args"]["remaining"][0]["name"], "force");
    assert_eq!(json["args"]["exhausted"], false);
    assert_eq!(json["ready"], false);
}

// ─── lazy resolution ─────────────────────────────────────────────────────────

#[test]
fn unresolved_text_stays_pending() {
    let dir = fixture();
    let (_, json) = run_json(dir.path(), &["parse", "deploy staging"]);
    assert_eq!(json["ast"]["pending"]["path"], serde_json::json!(["deploy"]));
}

#[test]
fn resolve_loads_subcommands_from_file() {
    let dir = fixture();
    let (_, json) = run_json(
        dir.path(),
        &["args", "deploy staging --tag v1", "--resolve"],
    );
    assert_eq!(json["path"], serde_json::json!(["deploy", "staging"]));
    assert_eq!(json["args"]["parsed"]["tag"], "v1");
    assert_eq!(json["ready"], true);
}

#[test]
fn complete_with_resolve_lists_loaded_names() {
    let dir = fixture();
    let (_, json) = run_json(dir.path(), &["complete", "deploy st", "--resolve"]);
    let values: Vec<_> = json["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["value"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(values, ["staging", "stable"]);
}

#[test]
fn complete_without_resolve_reports_hint() {
    let dir = fixture();
    let (_, json) = run_json(dir.path(), &["complete", "deploy "]);
    assert!(json["suggestions"].as_array().unwrap().is_empty());
    assert_eq!(json["needs_resolution"]["path"][0], "deploy");
}

// ─── check / explain ─────────────────────────────────────────────────────────

#[test]
fn check_exits_nonzero_when_not_ready() {
    let dir = fixture();
    let (output, json) = run_json(dir.path(), &["check", "sed"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["ready"], false);
    assert_eq!(json["diagnostics"][0]["id"], "CLUI1001");
}

#[test]
fn check_ready_command() {
    let dir = fixture();
    let (output, json) = run_json(dir.path(), &["check", "seed --count 2 --force"]);
    assert!(output.status.success());
    assert_eq!(json["ready"], true);
    assert!(json["diagnostics"].as_array().unwrap().is_empty());
}

#[test]
fn check_pretty_renders_report() {
    let dir = fixture();
    let output = clui_cmd(dir.path())
        .args(["check", "seed --count", "--output", "pretty"])
        .output()
        .expect("run clui");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CLUI2002"), "unexpected output: {stderr}");
}

#[test]
fn explain_known_and_unknown_codes() {
    let dir = fixture();
    let (output, json) = run_json(dir.path(), &["explain", "CLUI3001"]);
    assert!(output.status.success());
    assert!(json["explanation"].is_string());

    let (_, json) = run_json(dir.path(), &["explain", "CLUI9999"]);
    assert!(json["explanation"].is_null());
}

#[test]
fn missing_grammar_is_an_error() {
    let output = Command::new(cargo::cargo_bin!("clui"))
        .env_remove("CLUI_GRAMMAR")
        .args(["parse", "seed"])
        .output()
        .expect("run clui");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CLUI_GRAMMAR"), "unexpected output: {stderr}");
}
