//! CLI argument definitions and `LaunchProfile` construction.
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use super::{build_launch_args, resolve_config_path, resolve_token, LaunchProfile, TransportMode};

/// Parsed command intent from CLI.
#[derive(Debug, Clone)]
pub enum ParsedCommand {
    RunServer(LaunchProfile),
    Cli(CliCommand),
}

/// Top-level optional CLI commands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Inspect the server configuration without starting a transport.
    #[command(about = "Inspect the server configuration")]
    Config(ConfigArgs),
}

/// `config` command container.
#[derive(Debug, Clone, Args)]
#[command(
    about = "Inspect the server configuration",
    after_help = "Hint: use `tenki-mcp config check` before wiring the binary into an MCP client to surface config errors early."
)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration inspection subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Validate config.toml and print a JSON summary.
    Check(ConfigCheckArgs),
}

/// Arguments for `config check`.
#[derive(Debug, Clone, Args)]
pub struct ConfigCheckArgs {
    /// Path to config.toml (overrides MCP_CONFIG_PATH).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Tenki MCP (for MCP clients / Inspector)",
    long_about = None
)]
pub struct LaunchProfileArgs {
    /// Select stdio (default) or tcp.
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,
    /// Path to config.toml (overrides MCP_CONFIG_PATH).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Explicit token override via CLI.
    #[arg(long = "token")]
    pub token_override: Option<String>,
    /// Optional CLI command mode.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl LaunchProfileArgs {
    /// Build a `LaunchProfile` from CLI args and environment variables.
    pub fn build(self) -> Result<LaunchProfile> {
        let config_path = resolve_config_path(self.config_override)?;
        let (shared_token, token_source) = resolve_token(self.token_override);

        let launch_args = build_launch_args(self.transport, &config_path);

        Ok(LaunchProfile {
            config_path,
            transport: self.transport,
            shared_token,
            token_source,
            launch_args,
        })
    }

    /// Parse CLI args into either server launch mode or utility command mode.
    pub fn into_command(self) -> Result<ParsedCommand> {
        match self.command {
            Some(command) => Ok(ParsedCommand::Cli(command)),
            None => Ok(ParsedCommand::RunServer(self.build()?)),
        }
    }
}
