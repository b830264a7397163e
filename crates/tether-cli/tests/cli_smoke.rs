use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::process::Command;

const DIAGRAM: &str = r#"{
  "nodes": [
    {"id": "a", "position": [0.0, 0.0], "tags": ["x"], "createdAt": 3},
    {"id": "b", "position": [0.0, 140.0], "tags": ["x"], "createdAt": 1},
    {"id": "c", "position": [0.0, 280.0], "kind": "task", "createdAt": 2}
  ],
  "edges": [
    {"id": "ab", "source": "a", "target": "b", "relation": "causal"},
    {"id": "bc", "source": "b", "target": "c", "relation": "support"}
  ]
}"#;

fn write_fixture(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

fn run_json(args: &[&str]) -> Value {
    let exe = assert_cmd::cargo_bin!("tether-cli");
    let output = Command::new(exe).args(args).assert().success().get_output().clone();
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_flow_columns() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(&tmp, "diagram.json", DIAGRAM);

    let out = run_json(&["layout", input.to_string_lossy().as_ref()]);
    assert_eq!(out["layers"]["a"], 0);
    assert_eq!(out["layers"]["b"], 1);
    assert_eq!(out["layers"]["c"], 2);
    assert_eq!(out["positions"]["c"], serde_json::json!([560.0, 40.0]));
    let groups: Vec<&String> = out["groups"].as_object().unwrap().keys().collect();
    assert_eq!(groups, vec!["layer-0", "layer-1", "layer-2"]);
}

#[test]
fn cli_honours_mode_flag() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(&tmp, "diagram.json", DIAGRAM);

    let out = run_json(&["layout", "--mode", "byTags", input.to_string_lossy().as_ref()]);
    assert_eq!(out["groups"]["tag:x"], serde_json::json!(["a", "b"]));
    assert_eq!(out["groups"]["untagged"], serde_json::json!(["c"]));
}

#[test]
fn cli_simulation_settles_onto_layout() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(&tmp, "diagram.json", DIAGRAM);
    let config = write_fixture(&tmp, "config.json", r#"{"mode": "byTime"}"#);

    let out = run_json(&[
        "simulate",
        "--config",
        config.to_string_lossy().as_ref(),
        "--ticks",
        "400",
        input.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["settled"], true);
    assert_eq!(out["positions"]["b"], serde_json::json!([40.0, 40.0]));
    assert_eq!(out["positions"]["c"], serde_json::json!([40.0, 180.0]));
    assert_eq!(out["positions"]["a"], serde_json::json!([40.0, 320.0]));
}

#[test]
fn cli_static_preset_snaps_in_one_tick() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(&tmp, "diagram.json", DIAGRAM);

    let out = run_json(&[
        "simulate",
        "--preset",
        "static",
        input.to_string_lossy().as_ref(),
    ]);
    assert_eq!(out["ticks"], 1);
    assert_eq!(out["settled"], true);
    assert_eq!(out["positions"]["a"], serde_json::json!([40.0, 40.0]));
}

#[test]
fn cli_strict_rejects_dangling_edges() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let input = write_fixture(
        &tmp,
        "dangling.json",
        r#"{"nodes": [{"id": "a", "position": [0, 0]}],
            "edges": [{"id": "e1", "source": "a", "target": "ghost", "relation": "causal"}]}"#,
    );

    let exe = assert_cmd::cargo_bin!("tether-cli");
    Command::new(exe)
        .args(["--strict", input.to_string_lossy().as_ref()])
        .assert()
        .failure()
        .code(1);

    let out = run_json(&[input.to_string_lossy().as_ref()]);
    assert_eq!(out["layers"]["a"], 0);
}

#[test]
fn cli_usage_errors_exit_with_two() {
    let exe = assert_cmd::cargo_bin!("tether-cli");
    Command::new(exe)
        .args(["--ticks"])
        .assert()
        .failure()
        .code(2);
}
