//! Tool catalog advertised to clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatcher::Operation;

/// Tool definition as listed by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Helper function to create a JSON schema for tool input
pub fn json_schema(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Definitions for every supported operation, in catalog order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Operation::NAMES
        .iter()
        .map(|name| definition(name))
        .collect()
}

fn definition(name: &str) -> ToolDefinition {
    let (description, input_schema) = match name {
        "open" => (
            "Open the Voice Memos app and bring it to the front.",
            json_schema(serde_json::json!({}), vec![]),
        ),
        "list" => (
            "List voice memo recordings, most recent first, with size and modification time.",
            json_schema(
                serde_json::json!({
                    "limit": {
                        "type": "number",
                        "description": "Maximum number of recordings to return (default: 20)"
                    }
                }),
                vec![],
            ),
        ),
        "start_recording" => (
            "Start a new recording in Voice Memos. Requires Accessibility permission.",
            json_schema(serde_json::json!({}), vec![]),
        ),
        "stop_recording" => (
            "Stop the current recording in Voice Memos. Requires Accessibility permission.",
            json_schema(serde_json::json!({}), vec![]),
        ),
        "play" => (
            "Play a voice memo recording by file name (as shown by `list`).",
            json_schema(
                serde_json::json!({
                    "filename": {
                        "type": "string",
                        "description": "Name of the recording file, e.g. '20240101 120000.m4a'"
                    }
                }),
                vec!["filename"],
            ),
        ),
        _ => (
            "Show where recordings are stored, what this server can do, and required permissions.",
            json_schema(serde_json::json!({}), vec![]),
        ),
    };

    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}
