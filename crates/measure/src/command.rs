//! JSON command protocol for scripted measuring sessions.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::harness::MeasureHarness;
use crate::measurement::MeasurementId;

/// World point as `[x, y, z]`
pub type PointArg = [f64; 3];

fn point(p: PointArg) -> DVec3 {
    DVec3::from_array(p)
}

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ToolCommand {
    MeasureDistance {
        start: PointArg,
        end: PointArg,
        #[serde(default)]
        group_id: Option<String>,
    },
    /// Vertices in order. Closed explicitly when the last vertex does not
    /// repeat the first.
    MeasureArea {
        points: Vec<PointArg>,
    },
    MeasureLocation {
        point: PointArg,
    },
    MeasureRadius {
        start: PointArg,
        mid: PointArg,
        end: PointArg,
    },
    MeasureAngle {
        start: PointArg,
        center: PointArg,
        end: PointArg,
    },
    /// Undo the last commit of any tool.
    Undo,
    /// Redo the last undone commit.
    Redo,
    /// Drop every measurement.
    Clear,
    Lock {
        ids: Vec<String>,
        #[serde(default = "default_true")]
        locked: bool,
    },
    DropGroup {
        group_id: String,
    },
    /// List every measurement with its tooltip.
    Inspect,
    /// Export the measurements as a persisted document.
    Export,
}

fn default_true() -> bool {
    true
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn created(kind: &str, id: Option<MeasurementId>) -> CommandResponse {
    match id {
        Some(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id.to_string() })),
        None => CommandResponse::err(format!(
            "Could not build a {kind} measurement from the given points"
        )),
    }
}

fn parse_ids(ids: &[String]) -> Result<Vec<MeasurementId>, String> {
    ids.iter()
        .map(|s| Uuid::parse_str(s).map_err(|e| format!("Invalid measurement id {s:?}: {e}")))
        .collect()
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut MeasureHarness, cmd: ToolCommand) -> CommandResponse {
    match cmd {
        ToolCommand::MeasureDistance { start, end, group_id } => {
            let id = harness.measure_distance(point(start), point(end));
            if let (Some(id), Some(group)) = (id, group_id) {
                harness.set_group(id, Some(group));
            }
            created("distance", id)
        }

        ToolCommand::MeasureArea { points } => {
            let points: Vec<DVec3> = points.into_iter().map(point).collect();
            let id = harness.measure_area(&points);
            created("area", id)
        }

        ToolCommand::MeasureLocation { point: p } => {
            let id = harness.measure_location(point(p));
            created("location", id)
        }

        ToolCommand::MeasureRadius { start, mid, end } => {
            let id = harness.measure_radius(point(start), point(mid), point(end));
            created("radius", id)
        }

        ToolCommand::MeasureAngle { start, center, end } => {
            let id = harness.measure_angle(point(start), point(center), point(end));
            created("angle", id)
        }

        ToolCommand::Undo => {
            let success = harness.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        ToolCommand::Redo => {
            let success = harness.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        ToolCommand::Clear => {
            let dropped = harness.clear();
            CommandResponse::ok_with_data(serde_json::json!({ "dropped": dropped }))
        }

        ToolCommand::Lock { ids, locked } => match parse_ids(&ids) {
            Ok(ids) => {
                let changed = harness.lock(&ids, locked);
                CommandResponse::ok_with_data(serde_json::json!({ "changed": changed }))
            }
            Err(e) => CommandResponse::err(e),
        },

        ToolCommand::DropGroup { group_id } => {
            let dropped = harness.drop_group(&group_id);
            CommandResponse::ok_with_data(serde_json::json!({ "dropped": dropped }))
        }

        ToolCommand::Inspect => {
            let formatter = harness.ctx.formatter();
            let measurements: Vec<serde_json::Value> = harness
                .ctx
                .manager
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id().to_string(),
                        "kind": m.kind_name(),
                        "locked": m.is_locked(),
                        "visible": m.is_visible(),
                        "group_id": m.group_id(),
                        "tooltip": m.tooltip(formatter),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "measurement_count": measurements.len(),
                "measurements": measurements,
            }))
        }

        ToolCommand::Export => match harness.export_json() {
            Ok(json) => CommandResponse::ok_with_data(serde_json::json!({ "document_json": json })),
            Err(e) => CommandResponse::err(e),
        },
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut MeasureHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: ToolCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut MeasureHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ToolCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_undo() {
        let cmd: ToolCommand = serde_json::from_str(r#"{"command": "undo"}"#).unwrap();
        assert!(matches!(cmd, ToolCommand::Undo));
    }

    #[test]
    fn test_command_serde_measure_distance() {
        let json = r#"{"command": "measure_distance", "start": [0, 0, 0], "end": [3, 4, 0]}"#;
        let cmd: ToolCommand = serde_json::from_str(json).unwrap();
        match cmd {
            ToolCommand::MeasureDistance { end, group_id, .. } => {
                assert_eq!(end, [3.0, 4.0, 0.0]);
                assert!(group_id.is_none());
            }
            _ => panic!("Expected MeasureDistance"),
        }
    }

    #[test]
    fn test_command_serde_lock_defaults_to_locking() {
        let cmd: ToolCommand = serde_json::from_str(r#"{"command": "lock", "ids": []}"#).unwrap();
        assert!(matches!(cmd, ToolCommand::Lock { locked: true, .. }));
    }

    #[test]
    fn test_execute_measure_and_inspect() {
        let mut h = MeasureHarness::new();
        let resp = execute_json(
            &mut h,
            r#"{"command": "measure_distance", "start": [0, 0, 0], "end": [3, 4, 0],
                "group_id": "g"}"#,
        )
        .unwrap();
        assert!(resp.success);
        assert_eq!(h.count(), 1);

        let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data["measurement_count"], 1);
        assert_eq!(data["measurements"][0]["kind"], "distance");
        assert_eq!(data["measurements"][0]["group_id"], "g");
    }

    #[test]
    fn test_execute_degenerate_area_fails() {
        let mut h = MeasureHarness::new();
        let resp = execute_json(
            &mut h,
            r#"{"command": "measure_area", "points": [[0, 0, 0], [1, 0, 0], [2, 0, 0]]}"#,
        )
        .unwrap();
        assert!(!resp.success);
        assert!(resp.error.is_some());
        assert_eq!(h.count(), 0);
    }

    #[test]
    fn test_execute_undo_redo() {
        let mut h = MeasureHarness::new();
        execute_json(&mut h, r#"{"command": "measure_location", "point": [1, 2, 3]}"#).unwrap();

        let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["undone"], true);
        assert_eq!(h.count(), 0);

        let resp = execute_json(&mut h, r#"{"command": "redo"}"#).unwrap();
        assert_eq!(resp.data.unwrap()["redone"], true);
        assert_eq!(h.count(), 1);
    }

    #[test]
    fn test_execute_lock_rejects_bad_id() {
        let mut h = MeasureHarness::new();
        let resp = execute_json(&mut h, r#"{"command": "lock", "ids": ["nope"]}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_export() {
        let mut h = MeasureHarness::new();
        execute_json(&mut h, r#"{"command": "measure_location", "point": [1, 2, 3]}"#).unwrap();
        let resp = execute_json(&mut h, r#"{"command": "export"}"#).unwrap();
        let data = resp.data.unwrap();
        assert!(data["document_json"].as_str().unwrap().contains("\"location\""));
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = MeasureHarness::new();
        assert!(execute_json(&mut h, "not valid json").is_err());
    }
}
