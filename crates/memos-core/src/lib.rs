//! memos-core - Voice Memos automation bridge
//!
//! This crate provides:
//! - Shell-literal escaping for text embedded in automation commands
//! - A command runner that drives `osascript` and `afplay` through `/bin/sh`
//! - Fixed AppleScript templates for the Voice Memos app
//! - A catalog reader over the Voice Memos recordings directory
//! - The tool dispatcher that turns named operations into response envelopes

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod escape;
pub mod executor;
pub mod scripts;
pub mod tools;
pub mod types;

use std::path::PathBuf;

// Re-export main types for convenience
pub use catalog::{Catalog, Recording};
pub use dispatcher::{Dispatcher, Operation};
pub use error::{AutomationError, BridgeError, StorageUnavailable};
pub use escape::{applescript_string, escape, single_quote};
pub use executor::{CommandRunner, ShellRunner};
pub use scripts::Scripts;
pub use tools::{ToolDefinition, tool_definitions};
pub use types::{ContentBlock, ToolResponse};

/// Location of the Voice Memos recordings, relative to the user's home directory
pub const RECORDINGS_SUBPATH: &str =
    "Library/Group Containers/group.com.apple.VoiceMemos.shared/Recordings";

/// File extension Voice Memos uses for recordings
pub const RECORDING_EXTENSION: &str = "m4a";

/// Resolve the recordings directory for the current user.
///
/// Computed once at startup and handed to [`Catalog`]; falls back to the
/// current directory when no home directory can be determined.
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(RECORDINGS_SUBPATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        let _ = std::mem::size_of::<Catalog>();
        let _ = std::mem::size_of::<ToolResponse>();
        let _ = std::mem::size_of::<Scripts>();
        let _ = std::mem::size_of::<ShellRunner>();
    }

    #[test]
    fn test_default_storage_path() {
        let path = default_storage_path();
        assert!(path.ends_with("group.com.apple.VoiceMemos.shared/Recordings"));
        assert!(path.to_string_lossy().contains("Library/Group Containers"));
    }
}
