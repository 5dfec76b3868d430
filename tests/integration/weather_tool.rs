use anyhow::Result;
use rmcp::{model::CallToolRequestParam, service::ServiceError};
use serde_json::{json, Value};
use tempfile::tempdir;

use tenki_mcp::server::runtime::ToolboxServer;

use crate::common::{serve_in_process, test_server_config};

fn mcp_error_code(err: ServiceError) -> String {
    let ServiceError::McpError(error_data) = err else {
        panic!("expected an MCP error, got {err:?}");
    };
    error_data
        .data
        .and_then(|data| data.get("code").and_then(Value::as_str).map(String::from))
        .expect("error data should carry a code")
}

#[tokio::test]
async fn blank_city_is_rejected_before_any_network_call() -> Result<()> {
    let temp = tempdir()?;
    let config = test_server_config(temp.path().join("unused.db"), None);
    let server = ToolboxServer::new(config, "weather-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({ "city": "   " }).as_object().expect("object").clone();
    let err = client
        .call_tool(CallToolRequestParam {
            name: "query_weather".into(),
            arguments: Some(args),
        })
        .await
        .expect_err("blank city must fail validation");
    assert_eq!(mcp_error_code(err), "invalid_request");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn oversized_city_is_rejected_before_any_network_call() -> Result<()> {
    let temp = tempdir()?;
    let config = test_server_config(temp.path().join("unused.db"), None);
    let server = ToolboxServer::new(config, "weather-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({ "city": "x".repeat(200) })
        .as_object()
        .expect("object")
        .clone();
    let err = client
        .call_tool(CallToolRequestParam {
            name: "query_weather".into(),
            arguments: Some(args),
        })
        .await
        .expect_err("oversized city must fail validation");
    assert_eq!(mcp_error_code(err), "invalid_request");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn weather_tool_is_rejected_when_the_toolset_is_disabled() -> Result<()> {
    let temp = tempdir()?;
    let mut config = test_server_config(temp.path().join("unused.db"), None);
    config.tools.enabled = vec!["sqlite".into()];
    let server = ToolboxServer::new(config, "weather-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({ "city": "Beijing" }).as_object().expect("object").clone();
    let err = client
        .call_tool(CallToolRequestParam {
            name: "query_weather".into(),
            arguments: Some(args),
        })
        .await
        .expect_err("disabled toolset must reject the call");
    assert_eq!(mcp_error_code(err), "toolset_disabled");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}
