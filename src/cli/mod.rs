//! CLI entrypoint module structure.

use anyhow::{Context, Result};
use serde_json::json;

use crate::server::config::ServerConfig;

pub mod args;
pub mod profile;

pub use args::{CliCommand, ConfigArgs, ConfigCheckArgs, ConfigCommand, LaunchProfileArgs, ParsedCommand};
pub use profile::{
    build_launch_args, resolve_config_path, resolve_token, LaunchProfile, TokenSource,
    TransportMode,
};

/// Execute CLI command mode and return a user-facing result payload.
pub fn execute_cli_command(command: CliCommand) -> Result<String> {
    match command {
        CliCommand::Config(config) => match config.command {
            ConfigCommand::Check(args) => {
                let path = resolve_config_path(args.config_override)?;
                check_config_at_path(path)
            }
        },
    }
}

/// Load and validate a config file, formatting a JSON response payload.
fn check_config_at_path(path: std::path::PathBuf) -> Result<String> {
    let config = ServerConfig::load_from_path(path.clone())
        .with_context(|| format!("config check failed for {}", path.display()))?;

    let payload = json!({
        "status": "ok",
        "config_path": config.source_path.to_string_lossy(),
        "host": config.server.host,
        "port": config.server.port,
        "enabled_toolsets": config.tools.enabled,
        "sqlite_db_path": config.sqlite.as_ref().map(|s| s.db_path.to_string_lossy().into_owned()),
        "chat_servers": config.chat.servers.iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
        "message": "configuration is valid"
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}
