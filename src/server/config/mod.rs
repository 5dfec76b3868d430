//! Load and validate server configuration.
use std::{env, path::PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::errors::ConfigError;

pub mod auth;
pub mod chat;
pub mod server;
pub mod sqlite;
pub mod telemetry;
pub mod tools;
pub mod weather;

pub use auth::{parse_auth_section, AuthSection, RawAuthSection};
pub use chat::{
    parse_chat_section, ChatSection, ChatServerSection, RawChatSection, DEFAULT_CHAT_API_BASE,
    DEFAULT_CHAT_TIMEOUT_SECS, DEFAULT_MAX_HISTORY,
};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};
pub use sqlite::{parse_sqlite_section, RawSqliteSection, SqliteSection, DEFAULT_MAX_ROWS};
pub use tools::{parse_tools_section, RawToolsSection, ToolsSection, TOOLSET_SQLITE, TOOLSET_WEATHER};
pub use weather::{
    parse_weather_section, RawWeatherSection, WeatherSection, DEFAULT_WEATHER_API_BASE,
    DEFAULT_WEATHER_LANG, DEFAULT_WEATHER_TIMEOUT_SECS,
};

const CONFIG_ENV_KEY: &str = "MCP_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub auth: AuthSection,
    pub tools: ToolsSection,
    pub weather: WeatherSection,
    pub sqlite: Option<SqliteSection>,
    pub chat: ChatSection,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawServerConfig {
    server: Option<RawServerSection>,
    auth: Option<RawAuthSection>,
    tools: Option<RawToolsSection>,
    weather: Option<RawWeatherSection>,
    sqlite: Option<RawSqliteSection>,
    chat: Option<RawChatSection>,
}

impl ServerConfig {
    /// Prefer `MCP_CONFIG_PATH` if set; otherwise read `config.toml`.
    pub fn load_from_env_or_default() -> Result<Self, ConfigError> {
        let (path, from_env) = match env::var(CONFIG_ENV_KEY) {
            Ok(value) if !value.trim().is_empty() => (PathBuf::from(value), true),
            _ => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        telemetry::log_env_source(&path, from_env);
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        info!(
            target: "tenki_mcp::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "tenki_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "tenki_mcp::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "tenki_mcp::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawServerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server, &path)?;
        let auth = parse_auth_section(raw.auth, &path)?;
        let tools = parse_tools_section(raw.tools, &path)?;
        let weather = parse_weather_section(raw.weather, &path)?;
        let sqlite = parse_sqlite_section(raw.sqlite, &path, tools.is_enabled(TOOLSET_SQLITE))?;
        let chat = parse_chat_section(raw.chat, &path)?;

        Ok(Self {
            server,
            auth,
            tools,
            weather,
            sqlite,
            chat,
            source_path: path,
        })
    }
}
