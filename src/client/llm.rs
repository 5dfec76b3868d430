//! OpenAI-compatible chat completions client with function calling.

use std::{env, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::server::config::ChatSection;

use super::{pool::AggregatedTool, ChatClientError};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const MODEL_ENV: &str = "MODEL";

/// Resolved LLM endpoint settings. Environment variables override the
/// `[chat]` section so the client can be pointed at any compatible API
/// without editing config.toml.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub request_timeout: Duration,
}

impl LlmConfig {
    pub fn from_chat_section(chat: &ChatSection) -> Result<Self, ChatClientError> {
        let api_key = nonempty_env(OPENAI_API_KEY_ENV).ok_or(ChatClientError::MissingApiKey)?;
        let api_base = nonempty_env(BASE_URL_ENV).unwrap_or_else(|| chat.api_base.clone());
        let model = nonempty_env(MODEL_ENV)
            .or_else(|| chat.model.clone())
            .ok_or(ChatClientError::MissingModel)?;
        Ok(Self {
            api_key,
            api_base,
            model,
            request_timeout: Duration::from_secs(chat.request_timeout_secs),
        })
    }
}

fn nonempty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// One message on the chat completions wire. Assistant tool-call turns carry
/// `tool_calls` and no content; tool result turns carry `tool_call_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// The API delivers arguments as a JSON-encoded string, not an object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub spec_type: String,
    pub function: FunctionSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Convert an aggregated MCP tool into a function spec. Only the schema
/// fields the chat completions API understands are kept.
pub fn tool_spec_from_mcp(tool: &AggregatedTool) -> ToolSpec {
    let schema = tool.tool.input_schema.as_ref();
    let mut parameters = serde_json::Map::new();
    parameters.insert(
        "type".to_string(),
        schema.get("type").cloned().unwrap_or_else(|| json!("object")),
    );
    parameters.insert(
        "properties".to_string(),
        schema.get("properties").cloned().unwrap_or_else(|| json!({})),
    );
    parameters.insert(
        "required".to_string(),
        schema.get("required").cloned().unwrap_or_else(|| json!([])),
    );

    ToolSpec {
        spec_type: "function".to_string(),
        function: FunctionSpec {
            name: tool.qualified_name.clone(),
            description: tool
                .tool
                .description
                .as_ref()
                .map(|text| text.to_string())
                .unwrap_or_default(),
            parameters: Value::Object(parameters),
        },
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub message: ChatMessage,
}

pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One chat completion round trip.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ChatCompletionResponse, ChatClientError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            tools,
        };
        debug!(
            target: "tenki_chat::llm",
            model = %self.config.model,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&self.config.api_base)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatClientError::LlmApi {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
