//! Multi-server MCP session pool for the chat client.
//!
//! Each configured server is spawned as a child process; its stdio pipes are
//! bridged into an rmcp client transport. Tools are aggregated under
//! `<server>_<tool>` names so a single function-calling namespace can route
//! back to the owning server.

use std::{collections::BTreeMap, io, process::Stdio, time::Duration};

use rmcp::{
    model::{CallToolRequestParam, CallToolResult, ClientInfo, Tool},
    serve_client,
    service::{RoleClient, RunningService},
};
use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
};
use tracing::{info, warn};

use crate::server::config::ChatServerSection;

use super::ChatClientError;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// One tool advertised by a connected server, under its qualified name.
#[derive(Debug, Clone)]
pub struct AggregatedTool {
    pub qualified_name: String,
    pub server: String,
    pub tool: Tool,
}

struct ServerSession {
    child: Child,
    service: RunningService<RoleClient, ClientInfo>,
}

/// Pool of MCP sessions keyed by server name.
pub struct McpServerPool {
    sessions: BTreeMap<String, ServerSession>,
}

impl McpServerPool {
    /// Spawn and initialize every configured server.
    pub async fn connect(servers: &[ChatServerSection]) -> Result<Self, ChatClientError> {
        if servers.is_empty() {
            return Err(ChatClientError::NoServers);
        }

        let mut sessions = BTreeMap::new();
        for server in servers {
            let session = spawn_one(server).await?;
            sessions.insert(server.name.clone(), session);
        }
        Ok(Self { sessions })
    }

    /// Names of the connected servers.
    pub fn server_names(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    /// List every tool across every server under qualified names.
    pub async fn list_all_tools(&self) -> Result<Vec<AggregatedTool>, ChatClientError> {
        let mut aggregated = Vec::new();
        for (server_name, session) in &self.sessions {
            let list = session.service.list_tools(None).await?;
            for tool in list.tools {
                aggregated.push(AggregatedTool {
                    qualified_name: qualified_tool_name(server_name, tool.name.as_ref()),
                    server: server_name.clone(),
                    tool,
                });
            }
        }
        Ok(aggregated)
    }

    /// Call a tool by its qualified `<server>_<tool>` name and render the
    /// result as text for the model.
    pub async fn call_tool(
        &self,
        qualified_name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<String, ChatClientError> {
        let (server, tool) =
            split_qualified_name(qualified_name).ok_or_else(|| ChatClientError::BadToolName {
                name: qualified_name.to_string(),
            })?;
        let session = self
            .sessions
            .get(server)
            .ok_or_else(|| ChatClientError::UnknownServer {
                name: server.to_string(),
            })?;

        info!(
            target: "tenki_chat::pool",
            server = server,
            tool = tool,
            "Calling MCP tool"
        );
        let result = session
            .service
            .call_tool(CallToolRequestParam {
                name: tool.to_string().into(),
                arguments,
            })
            .await?;
        Ok(render_tool_result(&result))
    }

    /// Cancel every session and reap the child processes.
    pub async fn shutdown(self) {
        for (name, session) in self.sessions {
            if let Err(err) = session.service.cancel().await {
                warn!(
                    target: "tenki_chat::pool",
                    server = %name,
                    error = %err,
                    "Failed to cancel MCP session"
                );
            }
            let mut child = session.child;
            match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!(
                    target: "tenki_chat::pool",
                    server = %name,
                    exit_status = %status,
                    "MCP server exited"
                ),
                _ => {
                    warn!(
                        target: "tenki_chat::pool",
                        server = %name,
                        "MCP server did not exit in time; killing"
                    );
                    let _ = child.start_kill();
                }
            }
        }
    }
}

async fn spawn_one(server: &ChatServerSection) -> Result<ServerSession, ChatClientError> {
    let mut command = Command::new(&server.command);
    command
        .args(&server.args)
        .envs(&server.env)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    let mut child = command.spawn().map_err(|source| ChatClientError::ServerSpawn {
        name: server.name.clone(),
        source,
    })?;

    let stdout = child.stdout.take().ok_or_else(|| ChatClientError::ServerSpawn {
        name: server.name.clone(),
        source: io::Error::other("child stdout missing"),
    })?;
    let stdin = child.stdin.take().ok_or_else(|| ChatClientError::ServerSpawn {
        name: server.name.clone(),
        source: io::Error::other("child stdin missing"),
    })?;

    let bridge = ChildIoBridge::new(stdout, stdin);
    let service = serve_client(ClientInfo::default(), bridge)
        .await
        .map_err(|err| ChatClientError::Handshake {
            name: server.name.clone(),
            message: err.to_string(),
        })?;

    info!(
        target: "tenki_chat::pool",
        server = %server.name,
        command = %server.command,
        "Connected to MCP server"
    );
    Ok(ServerSession { child, service })
}

/// Mangle a server/tool pair into the function-calling namespace.
pub fn qualified_tool_name(server: &str, tool: &str) -> String {
    format!("{server}_{tool}")
}

/// Split a qualified name back into server and tool at the first underscore.
pub fn split_qualified_name(qualified_name: &str) -> Option<(&str, &str)> {
    let mut parts = qualified_name.splitn(2, '_');
    let server = parts.next().filter(|part| !part.is_empty())?;
    let tool = parts.next().filter(|part| !part.is_empty())?;
    Some((server, tool))
}

/// Render a tool result as text: structured content wins, then the first
/// text block, then a fixed marker (the model needs some tool output).
pub fn render_tool_result(result: &CallToolResult) -> String {
    if let Some(structured) = &result.structured_content {
        return structured.to_string();
    }
    result
        .content
        .first()
        .and_then(|content| content.as_text())
        .map(|text| text.text.clone())
        .unwrap_or_else(|| "tool produced no output".to_string())
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::{CallToolResult, Content};

    use super::*;

    #[test]
    fn qualified_names_round_trip() {
        let qualified = qualified_tool_name("weather", "query_weather");
        assert_eq!(qualified, "weather_query_weather");
        assert_eq!(
            split_qualified_name(&qualified),
            Some(("weather", "query_weather"))
        );
    }

    #[test]
    fn tool_names_keep_their_own_underscores() {
        assert_eq!(
            split_qualified_name("data_export_table_to_csv"),
            Some(("data", "export_table_to_csv"))
        );
    }

    #[test]
    fn malformed_names_are_rejected() {
        assert_eq!(split_qualified_name("plainname"), None);
        assert_eq!(split_qualified_name("_tool"), None);
        assert_eq!(split_qualified_name("server_"), None);
    }

    #[test]
    fn text_content_is_rendered_when_no_structured_content() {
        let result = CallToolResult::success(vec![Content::text("sunny")]);
        assert_eq!(render_tool_result(&result), "sunny");
    }

    #[test]
    fn empty_content_renders_the_no_output_marker() {
        let result = CallToolResult::success(vec![]);
        assert_eq!(render_tool_result(&result), "tool produced no output");
    }
}
