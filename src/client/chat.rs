//! Interactive chat loop: user turns go to the model, tool-call turns are
//! routed through the MCP server pool until the model produces an answer.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::server::config::ChatSection;

use super::{
    llm::{tool_spec_from_mcp, ChatMessage, LlmClient, ToolSpec},
    pool::McpServerPool,
    ChatClientError,
};

const QUIT_COMMAND: &str = "quit";

pub struct ChatSession {
    pool: McpServerPool,
    llm: LlmClient,
    tools: Vec<ToolSpec>,
    max_history: usize,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Aggregate tools from the pool and prepare an empty history.
    pub async fn new(
        chat: &ChatSection,
        pool: McpServerPool,
        llm: LlmClient,
    ) -> Result<Self, ChatClientError> {
        let aggregated = pool.list_all_tools().await?;
        let tools: Vec<ToolSpec> = aggregated.iter().map(tool_spec_from_mcp).collect();
        info!(
            target: "tenki_chat::session",
            model = %llm.model(),
            server_count = pool.server_names().len(),
            tool_count = tools.len(),
            "Chat session ready"
        );
        Ok(Self {
            pool,
            llm,
            tools,
            max_history: chat.max_history,
            messages: Vec::new(),
        })
    }

    pub fn server_names(&self) -> Vec<String> {
        self.pool.server_names()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|tool| tool.function.name.clone())
            .collect()
    }

    /// One user turn: send history to the model, run any requested tool
    /// calls, and repeat until the model stops asking for tools.
    pub async fn process_turn(&mut self, user_input: &str) -> Result<String, ChatClientError> {
        self.messages.push(ChatMessage::user(user_input));
        trim_history(&mut self.messages, self.max_history);

        loop {
            let response = self.llm.complete(&self.messages, Some(&self.tools)).await?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(ChatClientError::EmptyChoices)?;

            if choice.finish_reason.as_deref() != Some("tool_calls") {
                let reply = choice.message.content.clone().unwrap_or_default();
                self.messages.push(choice.message);
                return Ok(reply);
            }

            let tool_calls = choice.message.tool_calls.clone().unwrap_or_default();
            self.messages.push(choice.message);
            for call in tool_calls {
                let arguments = parse_arguments(&call.function.arguments);
                let output = match self.pool.call_tool(&call.function.name, arguments).await {
                    Ok(output) => output,
                    // A failed tool call is fed back to the model instead of
                    // aborting the turn, so it can recover or explain.
                    Err(err) => {
                        warn!(
                            target: "tenki_chat::session",
                            tool = %call.function.name,
                            error = %err,
                            "Tool call failed"
                        );
                        format!("tool call failed: {err}")
                    }
                };
                self.messages.push(ChatMessage::tool(output, call.id));
            }
        }
    }

    /// Read-eval loop over stdin. `quit` (or EOF) ends the session.
    pub async fn run_loop(&mut self) -> Result<(), ChatClientError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("\nYou: ");
            let _ = std::io::stdout().flush();
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if query.eq_ignore_ascii_case(QUIT_COMMAND) {
                break;
            }
            match self.process_turn(query).await {
                Ok(reply) => println!("\nAI: {reply}"),
                Err(err) => eprintln!("warning: query failed: {err}"),
            }
        }
        Ok(())
    }

    /// Tear down the MCP sessions and reap the spawned servers.
    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}

/// Drop the oldest messages once the history exceeds the cap.
fn trim_history(messages: &mut Vec<ChatMessage>, max_history: usize) {
    if messages.len() > max_history {
        let excess = messages.len() - max_history;
        messages.drain(..excess);
    }
}

/// The API encodes tool arguments as a JSON string; a malformed payload is
/// treated as "no arguments" rather than a hard error.
fn parse_arguments(arguments: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    serde_json::from_str::<serde_json::Value>(arguments)
        .ok()
        .and_then(|value| value.as_object().cloned())
        .filter(|object| !object.is_empty())
}
