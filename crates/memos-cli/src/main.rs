use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use memos_core::{Catalog, Dispatcher, Scripts, ShellRunner, default_storage_path, tool_definitions};
use memos_mcp::{McpServer, StdioTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::MemosConfig;

#[derive(Parser)]
#[command(name = "memos")]
#[command(version)]
#[command(about = "memos — control Voice Memos from an MCP client")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (the default)
    Serve,

    /// Run a single tool and print its output
    Call {
        /// Tool name, e.g. `list` or `play`
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },

    /// Print the tool catalog as JSON
    Tools,

    /// Write the default config to ~/.memos/config.toml
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = MemosConfig::load(&cli.config)?;

    // stdout belongs to the protocol; logs go to stderr
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(&cfg).await,
        Commands::Call { tool, args } => cmd_call(&cfg, &tool, args.as_deref()).await,
        Commands::Tools => cmd_tools(),
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cfg),
    }
}

fn build_dispatcher(cfg: &MemosConfig) -> Arc<Dispatcher> {
    let storage = default_storage_path();
    info!("Recordings folder: {}", storage.display());

    let automation = &cfg.automation;
    let scripts = Scripts::new(
        automation.app_name.as_str(),
        automation.process_name.as_str(),
        automation.player.as_str(),
    );
    let runner = ShellRunner::new(automation.shell.as_str(), automation.max_output_bytes);
    Arc::new(Dispatcher::new(Catalog::new(storage), scripts, Arc::new(runner)))
}

async fn cmd_serve(cfg: &MemosConfig) -> Result<()> {
    let dispatcher = build_dispatcher(cfg);
    let mut server = McpServer::new(dispatcher, cfg.server.name.as_str());
    let mut transport = StdioTransport::new();
    server
        .run(&mut transport)
        .await
        .context("MCP server failed")?;
    Ok(())
}

fn parse_args(args: Option<&str>) -> Result<serde_json::Value> {
    let Some(raw) = args else {
        return Ok(serde_json::json!({}));
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--args must be valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--args must be a JSON object, got: {}", raw);
    }
    Ok(value)
}

async fn cmd_call(cfg: &MemosConfig, tool: &str, args: Option<&str>) -> Result<()> {
    let arguments = parse_args(args)?;
    let dispatcher = build_dispatcher(cfg);
    let response = dispatcher.dispatch(tool, arguments).await;

    println!("{}", response.joined_text());
    if response.is_error {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_tools() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
    Ok(())
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        tokio::fs::write(&config_path, config::DEFAULT_CONFIG).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("memos initialized at {}", config_dir.display());
    Ok(())
}

fn cmd_config(cfg: &MemosConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(cfg)?);
    println!("# recordings folder (fixed): {}", default_storage_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["memos"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_call_with_args() {
        let cli = Cli::try_parse_from([
            "memos",
            "--debug",
            "call",
            "play",
            "--args",
            r#"{"filename":"a.m4a"}"#,
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Call { tool, args }) => {
                assert_eq!(tool, "play");
                assert_eq!(args.as_deref(), Some(r#"{"filename":"a.m4a"}"#));
            }
            _ => panic!("expected call subcommand"),
        }
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(None).unwrap(), serde_json::json!({}));
        assert_eq!(
            parse_args(Some(r#"{"limit": 3}"#)).unwrap(),
            serde_json::json!({"limit": 3})
        );
        assert!(parse_args(Some("[1,2]")).is_err());
        assert!(parse_args(Some("{oops")).is_err());
    }
}
