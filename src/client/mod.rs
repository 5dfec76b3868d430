//! Interactive chat client: an OpenAI-compatible model plus tools pulled
//! from one or more spawned MCP servers.

use std::io;

use thiserror::Error;

pub mod chat;
pub mod llm;
pub mod pool;

pub use chat::ChatSession;
pub use llm::{ChatMessage, LlmClient, LlmConfig, ToolSpec};
pub use pool::{AggregatedTool, McpServerPool};

#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("no chat model configured (set chat.model in config.toml or the MODEL environment variable)")]
    MissingModel,
    #[error("no MCP servers configured (add [[chat.servers]] entries to config.toml)")]
    NoServers,
    #[error("failed to spawn MCP server `{name}`: {source}")]
    ServerSpawn {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("MCP handshake with server `{name}` failed: {message}")]
    Handshake { name: String, message: String },
    #[error("MCP request failed: {0}")]
    Service(#[from] rmcp::service::ServiceError),
    #[error("tool name `{name}` is not prefixed with a known server")]
    BadToolName { name: String },
    #[error("no connected server named `{name}`")]
    UnknownServer { name: String },
    #[error("chat completion request failed: {0}")]
    Llm(#[from] reqwest::Error),
    #[error("chat completion API returned HTTP {status}: {body}")]
    LlmApi { status: u16, body: String },
    #[error("chat completion response contained no choices")]
    EmptyChoices,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
