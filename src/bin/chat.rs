//! Entry point for the Tenki chat client.
//!
//! Spawns the MCP servers declared under `[[chat.servers]]`, aggregates
//! their tools, and runs an interactive function-calling loop against an
//! OpenAI-compatible chat completions endpoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tenki_mcp::{
    cli::resolve_config_path,
    client::{ChatSession, LlmClient, LlmConfig, McpServerPool},
    lib::telemetry,
    server::config::ServerConfig,
};

#[derive(Debug, Parser)]
#[command(
    name = "tenki-chat",
    version,
    about = "Chat with an LLM that can call tools on configured MCP servers"
)]
struct ChatArgs {
    /// Path to config.toml. Falls back to MCP_CONFIG_PATH, then ./config.toml.
    #[arg(long = "config", value_name = "PATH")]
    config_override: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;
    let args = ChatArgs::parse();

    let config_path = resolve_config_path(args.config_override)?;
    let config = ServerConfig::load_from_path(config_path.clone())
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let llm = LlmClient::new(LlmConfig::from_chat_section(&config.chat)?);
    let pool = McpServerPool::connect(&config.chat.servers).await?;
    let mut session = ChatSession::new(&config.chat, pool, llm).await?;

    println!("Connected servers: {}", session.server_names().join(", "));
    println!("Available tools: {}", session.tool_names().join(", "));
    println!("Type your question, or 'quit' to exit.");

    let outcome = session.run_loop().await;
    session.shutdown().await;
    outcome.map_err(Into::into)
}
