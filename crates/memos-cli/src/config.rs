use anyhow::{Context, Result};
use memos_core::executor::{DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_SHELL};
use memos_core::scripts::{DEFAULT_APP_NAME, DEFAULT_PLAYER, DEFAULT_PROCESS_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemosConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub automation: AutomationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

fn default_server_name() -> String {
    "voice-memos".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How automation commands are built and run. The recordings folder is
/// deliberately absent: it is always derived from the home directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_process_name")]
    pub process_name: String,
    #[serde(default = "default_player")]
    pub player: String,
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            app_name: default_app_name(),
            process_name: default_process_name(),
            player: default_player(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_process_name() -> String {
    DEFAULT_PROCESS_NAME.to_string()
}

fn default_player() -> String {
    DEFAULT_PLAYER.to_string()
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memos")
}

pub const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

impl MemosConfig {
    /// Load from `custom_path`, or from `~/.memos/config.toml`.
    ///
    /// A missing default file means built-in defaults; a missing custom
    /// file is an error.
    pub fn load(custom_path: &Option<PathBuf>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from(path),
            None => {
                let path = config_dir().join("config.toml");
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;

        if config.automation.max_output_bytes == 0 {
            warn!("automation.max_output_bytes is 0; every command with output will fail");
        }

        Ok(config)
    }
}
