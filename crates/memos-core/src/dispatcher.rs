//! Tool dispatcher: operation names in, response envelopes out
//!
//! Every outcome crosses this boundary as a [`ToolResponse`]. Only requests
//! the caller has to fix (bad arguments, unknown tools) or internal faults
//! set `isError`; environment problems such as missing permissions come
//! back as ordinary text explaining what to do.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::catalog::{Catalog, Recording};
use crate::error::BridgeError;
use crate::escape::escape;
use crate::executor::CommandRunner;
use crate::scripts::Scripts;
use crate::types::{ContentBlock, ToolResponse};

pub const NO_RECORDINGS_MESSAGE: &str = "No voice memos found.";

const ACCESSIBILITY_HINT: &str = "Make sure Voice Memos is open and that the app running this \
    server has Accessibility permission (System Settings > Privacy & Security > Accessibility).";

/// A validated tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Open,
    List { limit: i64 },
    StartRecording,
    StopRecording,
    Play { filename: String },
    GetInfo,
}

impl Operation {
    /// Wire names, in catalog order
    pub const NAMES: &'static [&'static str] = &[
        "open",
        "list",
        "start_recording",
        "stop_recording",
        "play",
        "get_info",
    ];

    pub const DEFAULT_LIST_LIMIT: i64 = 20;

    /// Validate a tool name and its arguments
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, BridgeError> {
        match name {
            "open" => Ok(Operation::Open),
            "list" => Ok(Operation::List {
                limit: parse_limit(arguments)?,
            }),
            "start_recording" => Ok(Operation::StartRecording),
            "stop_recording" => Ok(Operation::StopRecording),
            "play" => {
                let filename = arguments
                    .get("filename")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| BridgeError::Validation("filename is required".to_string()))?;
                Ok(Operation::Play {
                    filename: filename.to_string(),
                })
            }
            "get_info" => Ok(Operation::GetInfo),
            other => Err(BridgeError::UnknownOperation(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::List { .. } => "list",
            Operation::StartRecording => "start_recording",
            Operation::StopRecording => "stop_recording",
            Operation::Play { .. } => "play",
            Operation::GetInfo => "get_info",
        }
    }
}

fn parse_limit(arguments: &Value) -> Result<i64, BridgeError> {
    match arguments.get("limit") {
        None | Some(Value::Null) => Ok(Operation::DEFAULT_LIST_LIMIT),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| BridgeError::Validation(format!("limit is out of range: {}", n))),
        Some(other) => Err(BridgeError::Validation(format!(
            "limit must be a number, got {}",
            other
        ))),
    }
}

/// Maps operations onto the catalog and the command runner
pub struct Dispatcher {
    catalog: Catalog,
    scripts: Scripts,
    runner: Arc<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(catalog: Catalog, scripts: Scripts, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            catalog,
            scripts,
            runner,
        }
    }

    /// Run one tool call. Never fails: errors and panics inside the
    /// operation are turned into error envelopes.
    pub async fn dispatch(self: &Arc<Self>, name: &str, arguments: Value) -> ToolResponse {
        debug!("Dispatching tool: {} with arguments: {}", name, arguments);

        let this = Arc::clone(self);
        let tool = name.to_string();
        let task = tokio::spawn(async move { this.handle(&tool, &arguments).await });

        match task.await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Tool {} failed: {}", name, e);
                error_response(&e)
            }
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool handler panicked".to_string());
                error!("Tool {} panicked: {}", name, message);
                ToolResponse::error(format!("Error: {}", message))
            }
            Err(e) => {
                error!("Tool {} did not complete: {}", name, e);
                ToolResponse::error(format!("Error: {}", e))
            }
        }
    }

    async fn handle(&self, name: &str, arguments: &Value) -> Result<ToolResponse, BridgeError> {
        let operation = Operation::parse(name, arguments)?;
        let response = match operation {
            Operation::Open => self.open().await,
            Operation::List { limit } => self.list(limit),
            Operation::StartRecording => self.toggle_recording("start", "Recording started").await,
            Operation::StopRecording => self.toggle_recording("stop", "Recording stopped").await,
            Operation::Play { filename } => self.play(&filename),
            Operation::GetInfo => self.info(),
        };
        Ok(response)
    }

    async fn open(&self) -> ToolResponse {
        match self.runner.run(&self.scripts.activate()).await {
            Ok(_) => ToolResponse::text("Voice Memos opened"),
            Err(e) => {
                warn!("Failed to open Voice Memos: {}", e);
                ToolResponse::text(format!("Error opening Voice Memos: {}", e))
            }
        }
    }

    fn list(&self, limit: i64) -> ToolResponse {
        match self.catalog.list(limit) {
            Ok(recordings) if recordings.is_empty() => ToolResponse::text(NO_RECORDINGS_MESSAGE),
            Ok(recordings) => {
                let mut blocks = Vec::with_capacity(recordings.len() + 1);
                blocks.push(ContentBlock::text(format!("Voice Memos ({})", recordings.len())));
                blocks.extend(recordings.iter().map(|r| ContentBlock::text(render_recording(r))));
                ToolResponse::blocks(blocks)
            }
            Err(e) => {
                warn!("Recordings directory unavailable: {}", e);
                ToolResponse::text(format!(
                    "Could not access Voice Memos recordings: {}\n\
                     Expected location: {}\n\n\
                     Open Voice Memos at least once so the folder exists, and grant Full Disk \
                     Access to the app running this server if the folder is not readable.",
                    e.source,
                    e.path.display()
                ))
            }
        }
    }

    // Voice Memos exposes one record/stop toggle, so which of the two
    // happens depends on the app's state, not on `verb`.
    async fn toggle_recording(&self, verb: &str, confirmation: &str) -> ToolResponse {
        match self.runner.run(&self.scripts.toggle_recording()).await {
            Ok(_) => ToolResponse::text(confirmation),
            Err(e) => {
                warn!("Failed to {} recording: {}", verb, e);
                ToolResponse::text(format!("Could not {} recording. {}", verb, ACCESSIBILITY_HINT))
            }
        }
    }

    fn play(&self, filename: &str) -> ToolResponse {
        let path = self.catalog.resolve(filename);

        if !path.is_file() {
            warn!("No recording at {}", path.display());
            return ToolResponse::text(format!(
                "Could not play file: {}\n\
                 No such recording in {}. Use `list` to see available files.",
                filename,
                self.catalog.path().display()
            ));
        }

        let command = self.scripts.play(&escape(&path.to_string_lossy()));
        match self.runner.spawn_detached(&command) {
            Ok(()) => ToolResponse::text(format!("Playing: {}", filename)),
            Err(e) => {
                warn!("Failed to play {}: {}", filename, e);
                ToolResponse::text(format!(
                    "Could not play file: {}\n{}\n\
                     Recordings are read from {}. Use `list` to see available files.",
                    filename,
                    e,
                    self.catalog.path().display()
                ))
            }
        }
    }

    fn info(&self) -> ToolResponse {
        ToolResponse::text(format!(
            "Voice Memos bridge\n\n\
             Storage: {}\n\n\
             Capabilities:\n\
             - open: launch Voice Memos and bring it to the front\n\
             - list: list .m4a recordings, newest first (default 20)\n\
             - start_recording / stop_recording: click the record button\n\
             - play: play a recording with afplay\n\n\
             Limitations:\n\
             - start and stop press the same toggle button; the app's state decides the effect\n\
             - automation commands have no timeout, so a modal dialog can stall a request\n\
             - recordings synced only to iCloud may not be present on disk\n\n\
             Permissions:\n\
             - Accessibility: System Settings > Privacy & Security > Accessibility, \
             enable the app running this server\n\
             - Full Disk Access may be needed to read the storage folder",
            self.catalog.path().display()
        ))
    }
}

fn render_recording(recording: &Recording) -> String {
    format!(
        "{}\n  Size: {:.1} KB\n  Modified: {}",
        recording.name,
        recording.size_kib(),
        recording.modified_at.format("%-m/%-d/%Y, %-I:%M:%S %p")
    )
}

fn error_response(err: &BridgeError) -> ToolResponse {
    match err {
        BridgeError::UnknownOperation(_) => ToolResponse::error(err.to_string()),
        BridgeError::Validation(_) => ToolResponse::error(format!("Error: {}", err)),
    }
}
