use std::{collections::BTreeMap, collections::BTreeSet, path::Path};

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_CHAT_API_BASE: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MAX_HISTORY: usize = 20;
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 120;

/// Chat client configuration.
#[derive(Debug, Clone)]
pub struct ChatSection {
    pub model: Option<String>,
    pub api_base: String,
    pub max_history: usize,
    pub request_timeout_secs: u64,
    pub servers: Vec<ChatServerSection>,
}

/// One MCP server the chat client spawns as a child process.
#[derive(Debug, Clone)]
pub struct ChatServerSection {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawChatSection {
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub max_history: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub servers: Option<Vec<RawChatServerSection>>,
}

#[derive(Debug, Deserialize)]
pub struct RawChatServerSection {
    pub name: Option<String>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub env: Option<BTreeMap<String, String>>,
}

pub fn parse_chat_section(
    raw: Option<RawChatSection>,
    path: &Path,
) -> Result<ChatSection, ConfigError> {
    let chat_raw = raw.unwrap_or_default();

    let api_base = chat_raw
        .api_base
        .unwrap_or_else(|| DEFAULT_CHAT_API_BASE.to_string());
    if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "chat.api_base",
            message: "must be an http(s) URL".into(),
        });
    }

    let max_history = chat_raw.max_history.unwrap_or(DEFAULT_MAX_HISTORY);
    if max_history == 0 {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "chat.max_history",
            message: "must keep at least one message".into(),
        });
    }

    let request_timeout_secs = chat_raw
        .request_timeout_secs
        .unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS);
    if !(1..=600).contains(&request_timeout_secs) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "chat.request_timeout_secs",
            message: "use a timeout in the range 1-600 seconds".into(),
        });
    }

    let mut servers = Vec::new();
    let mut seen_names = BTreeSet::new();
    for raw_server in chat_raw.servers.unwrap_or_default() {
        let server = parse_chat_server(raw_server, path)?;
        if !seen_names.insert(server.name.clone()) {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "chat.servers.name",
                message: format!("duplicate server name `{}`", server.name),
            });
        }
        servers.push(server);
    }

    Ok(ChatSection {
        model: chat_raw.model,
        api_base,
        max_history,
        request_timeout_secs,
        servers,
    })
}

fn parse_chat_server(
    raw: RawChatServerSection,
    path: &Path,
) -> Result<ChatServerSection, ConfigError> {
    let name = raw
        .name
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingField {
            path: path.to_path_buf(),
            field: "chat.servers.name",
        })?;
    // The underscore separates the server prefix in mangled tool names, so it
    // cannot appear in a server name.
    if name.contains('_') {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "chat.servers.name",
            message: format!("server name `{name}` must not contain `_`"),
        });
    }

    let command = raw
        .command
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingField {
            path: path.to_path_buf(),
            field: "chat.servers.command",
        })?;

    Ok(ChatServerSection {
        name,
        command,
        args: raw.args.unwrap_or_default(),
        env: raw.env.unwrap_or_default(),
    })
}
