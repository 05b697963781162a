//! Error types for the automation bridge

use std::path::PathBuf;

/// Failure of an external automation command.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    #[error("Failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit. `diagnostic` is the captured stderr, or a generic
    /// message when the command wrote nothing there.
    #[error("{diagnostic}")]
    Failed {
        status: Option<i32>,
        diagnostic: String,
    },

    #[error("Command output exceeded {limit} bytes")]
    OutputLimit { limit: usize },

    #[error("IO error while running command: {0}")]
    Io(#[from] std::io::Error),
}

/// The recordings directory could not be read.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct StorageUnavailable {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A request the caller has to change before it can succeed.
///
/// Environment problems (automation or storage failures) are not listed
/// here: the dispatcher answers those with explanatory text instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown tool: {0}")]
    UnknownOperation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_failed_displays_diagnostic() {
        let err = AutomationError::Failed {
            status: Some(1),
            diagnostic: "execution error: Not authorized (-1743)".to_string(),
        };
        assert_eq!(err.to_string(), "execution error: Not authorized (-1743)");
    }

    #[test]
    fn test_storage_error_displays_source() {
        let err = StorageUnavailable {
            path: PathBuf::from("/tmp/nowhere"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(err.to_string(), "No such file or directory");
        assert_eq!(err.path, PathBuf::from("/tmp/nowhere"));
    }

    #[test]
    fn test_bridge_error_messages() {
        assert_eq!(
            BridgeError::Validation("filename is required".into()).to_string(),
            "filename is required"
        );
        assert_eq!(
            BridgeError::UnknownOperation("delete".into()).to_string(),
            "Unknown tool: delete"
        );
    }
}
