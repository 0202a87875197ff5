//! Integration tests for the ToolCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use measure_tools_lib::command::{execute_json, execute_json_batch};
use measure_tools_lib::harness::MeasureHarness;

#[test]
fn test_command_measure_every_kind() {
    let mut h = MeasureHarness::new();

    let json = r#"[
        {"command": "measure_distance", "start": [0, 0, 0], "end": [3, 4, 0]},
        {"command": "measure_area", "points": [[0, 0, 0], [4, 0, 0], [4, 3, 0]]},
        {"command": "measure_location", "point": [1, 1, 0]},
        {"command": "measure_radius", "start": [1, 0, 0], "mid": [0, 1, 0], "end": [-1, 0, 0]},
        {"command": "measure_angle", "start": [1, 0, 0], "center": [0, 0, 0], "end": [0, 1, 0]},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 6);
    assert!(responses.iter().all(|r| r.success));
    for r in &responses[..5] {
        assert!(r.data.as_ref().unwrap()["id"].as_str().is_some());
    }

    let data = responses[5].data.as_ref().unwrap();
    assert_eq!(data["measurement_count"], 5);
    let kinds: Vec<&str> = data["measurements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["distance", "area", "location", "radius", "angle"]);
}

#[test]
fn test_command_inspect_reports_tooltip() {
    let mut h = MeasureHarness::new();
    execute_json(
        &mut h,
        r#"{"command": "measure_distance", "start": [0, 0, 0], "end": [3, 4, 0]}"#,
    )
    .unwrap();

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    let data = resp.data.unwrap();
    let tooltip = data["measurements"][0]["tooltip"].as_array().unwrap();
    assert!(tooltip.len() >= 2);
    assert!(tooltip[1].as_str().unwrap().contains("5.00 m"));
}

#[test]
fn test_command_lock_and_unlock() {
    let mut h = MeasureHarness::new();
    let resp =
        execute_json(&mut h, r#"{"command": "measure_location", "point": [0, 0, 0]}"#).unwrap();
    let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();

    let lock = format!(r#"{{"command": "lock", "ids": ["{id}"]}}"#);
    let resp = execute_json(&mut h, &lock).unwrap();
    assert_eq!(resp.data.unwrap()["changed"], 1);

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["measurements"][0]["locked"], true);

    let unlock = format!(r#"{{"command": "lock", "ids": ["{id}"], "locked": false}}"#);
    let resp = execute_json(&mut h, &unlock).unwrap();
    assert_eq!(resp.data.unwrap()["changed"], 1);
}

#[test]
fn test_command_drop_group() {
    let mut h = MeasureHarness::new();
    let json = r#"[
        {"command": "measure_distance", "start": [0, 0, 0], "end": [1, 0, 0], "group_id": "survey"},
        {"command": "measure_distance", "start": [0, 0, 0], "end": [2, 0, 0], "group_id": "survey"},
        {"command": "measure_distance", "start": [0, 0, 0], "end": [3, 0, 0]},
        {"command": "drop_group", "group_id": "survey"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[3].data.as_ref().unwrap()["dropped"], 2);
    assert_eq!(h.count(), 1);
}

#[test]
fn test_command_undo_redo_clear() {
    let mut h = MeasureHarness::new();
    let json = r#"[
        {"command": "measure_location", "point": [0, 0, 0]},
        {"command": "measure_location", "point": [1, 0, 0]},
        {"command": "undo"},
        {"command": "undo"},
        {"command": "undo"},
        {"command": "redo"},
        {"command": "clear"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[2].data.as_ref().unwrap()["undone"], true);
    assert_eq!(responses[3].data.as_ref().unwrap()["undone"], true);
    assert_eq!(responses[4].data.as_ref().unwrap()["undone"], false);
    assert_eq!(responses[5].data.as_ref().unwrap()["redone"], true);
    assert_eq!(responses[6].data.as_ref().unwrap()["dropped"], 1);
    assert_eq!(h.count(), 0);
}

#[test]
fn test_command_export_document() {
    let mut h = MeasureHarness::new();
    let json = r#"[
        {"command": "measure_distance", "start": [0, 0, 0], "end": [3, 4, 0]},
        {"command": "measure_location", "point": [1, 1, 0]},
        {"command": "export"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    let doc = responses[2].data.as_ref().unwrap()["document_json"].as_str().unwrap();
    let value: serde_json::Value = serde_json::from_str(doc).unwrap();
    assert_eq!(value["measurements"].as_array().unwrap().len(), 2);
    assert_eq!(value["measurements"][0]["type"], "distance");
}

#[test]
fn test_command_unknown_command_is_error() {
    let mut h = MeasureHarness::new();
    assert!(execute_json(&mut h, r#"{"command": "explode"}"#).is_err());
    assert!(execute_json_batch(&mut h, r#"{"command": "undo"}"#).is_err());
}

#[test]
fn test_command_response_skips_empty_fields() {
    let mut h = MeasureHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
    let value = serde_json::to_value(&resp).unwrap();
    assert!(value.get("error").is_none());
    assert_eq!(value["success"], true);
}
