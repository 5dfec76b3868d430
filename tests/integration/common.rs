use std::{io, path::PathBuf, process::Stdio};

use anyhow::{Context, Result};
use rmcp::{model::ClientInfo, serve_client, service::{RoleClient, RunningService}, ServiceExt};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

use tenki_mcp::server::{
    config::{
        AuthSection, ChatSection, ServerConfig, ServerSection, SqliteSection, ToolsSection,
        WeatherSection,
    },
    runtime::ToolboxServer,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_tenki-mcp");
pub const VALID_TOKEN: &str = "valid-token-123456";

pub async fn spawn_server_process() -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .env(
            "MCP_CONFIG_PATH",
            fixture("tests/fixtures/config_valid.toml"),
        )
        .env("MCP_SHARED_TOKEN", VALID_TOKEN)
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().expect("child stdout");
    let stdin = child.stdin.take().expect("child stdin");
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

/// Config for in-process tool tests. Weather and SQLite toolsets are both
/// enabled so individual tests can exercise either.
pub fn test_server_config(db_path: PathBuf, export_dir: Option<PathBuf>) -> ServerConfig {
    ServerConfig {
        server: ServerSection {
            host: "127.0.0.1".into(),
            port: 8787,
        },
        auth: AuthSection {
            token: VALID_TOKEN.into(),
        },
        tools: ToolsSection {
            enabled: vec!["weather".into(), "sqlite".into()],
        },
        weather: WeatherSection {
            api_base: "https://api.weatherapi.com/v1/current.json".into(),
            lang: "en".into(),
            timeout_secs: 5,
        },
        sqlite: Some(SqliteSection {
            db_path,
            export_dir,
            max_rows: 1000,
        }),
        chat: ChatSection {
            model: None,
            api_base: "https://api.openai.com/v1/chat/completions".into(),
            max_history: 20,
            request_timeout_secs: 120,
            servers: Vec::new(),
        },
        source_path: PathBuf::from("tests/fixtures/config_valid.toml"),
    }
}

/// Serve a ToolboxServer over an in-memory duplex and hand back a connected
/// client plus the server task.
pub async fn serve_in_process(
    server: ToolboxServer,
) -> Result<(
    RunningService<RoleClient, ClientInfo>,
    JoinHandle<Result<()>>,
)> {
    let (server_transport, client_transport) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        Result::<_, anyhow::Error>::Ok(())
    });
    let client = serve_client(ClientInfo::default(), client_transport).await?;
    Ok((client, server_task))
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
