use std::path::Path;

use anyhow::Result;
use rmcp::{model::CallToolRequestParam, service::ServiceError};
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::tempdir;

use tenki_mcp::server::runtime::ToolboxServer;

use crate::common::{serve_in_process, test_server_config};

fn seed_database(db_path: &Path) {
    let conn = Connection::open(db_path).expect("can create test database");
    conn.execute_batch(
        "CREATE TABLE plans (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO plans VALUES (1, 'alpha');
         INSERT INTO plans VALUES (2, 'beta');",
    )
    .expect("can seed test database");
}

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
async fn sql_query_returns_structured_rows() -> Result<()> {
    let temp = tempdir()?;
    let db_path = temp.path().join("test.db");
    seed_database(&db_path);

    let config = test_server_config(db_path, None);
    let server = ToolboxServer::new(config, "sqlite-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({ "query": "SELECT id, name FROM plans ORDER BY id" })
        .as_object()
        .expect("object")
        .clone();
    let response = client
        .call_tool(CallToolRequestParam {
            name: "sql_query".into(),
            arguments: Some(args),
        })
        .await
        .expect("query should succeed");

    let payload = response.structured_content.expect("structured_content");
    assert_eq!(payload["columns"], json!(["id", "name"]));
    assert_eq!(payload["rows"], json!([[1, "alpha"], [2, "beta"]]));
    assert_eq!(payload["row_count"], json!(2));
    assert_eq!(payload["truncated"], json!(false));

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn export_writes_csv_under_the_allowed_directory() -> Result<()> {
    let temp = tempdir()?;
    let db_path = temp.path().join("test.db");
    seed_database(&db_path);
    let export_dir = temp.path().join("exports");
    let output_file = export_dir.join("plans.csv");

    let config = test_server_config(db_path, Some(export_dir));
    let server = ToolboxServer::new(config, "sqlite-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({
        "table": "plans",
        "output_file": output_file.to_string_lossy(),
    })
    .as_object()
    .expect("object")
    .clone();
    let response = client
        .call_tool(CallToolRequestParam {
            name: "export_table_to_csv".into(),
            arguments: Some(args),
        })
        .await
        .expect("export should succeed");

    let payload = response.structured_content.expect("structured_content");
    assert_eq!(payload["table"], json!("plans"));
    assert_eq!(payload["rows"], json!(2));

    let written = std::fs::read_to_string(&output_file)?;
    assert!(written.starts_with("id,name\r\n"), "csv: {written}");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn export_outside_allowlist_is_rejected_with_path_error() -> Result<()> {
    let temp = tempdir()?;
    let db_path = temp.path().join("test.db");
    seed_database(&db_path);
    let export_dir = temp.path().join("exports");

    let config = test_server_config(db_path, Some(export_dir));
    let server = ToolboxServer::new(config, "sqlite-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({
        "table": "plans",
        "output_file": "/tmp/escape.csv",
    })
    .as_object()
    .expect("object")
    .clone();
    let err = client
        .call_tool(CallToolRequestParam {
            name: "export_table_to_csv".into(),
            arguments: Some(args),
        })
        .await
        .expect_err("export outside the allowlist must fail");
    assert_eq!(mcp_error_code(err), "path_not_allowed");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}

#[tokio::test]
async fn sqlite_tools_are_rejected_when_the_toolset_is_disabled() -> Result<()> {
    let temp = tempdir()?;
    let db_path = temp.path().join("test.db");

    let mut config = test_server_config(db_path, None);
    config.tools.enabled = vec!["weather".into()];
    config.sqlite = None;
    let server = ToolboxServer::new(config, "sqlite-integration".into());
    let (client, server_task) = serve_in_process(server).await?;

    let args = json!({ "query": "SELECT 1" })
        .as_object()
        .expect("object")
        .clone();
    let err = client
        .call_tool(CallToolRequestParam {
            name: "sql_query".into(),
            arguments: Some(args),
        })
        .await
        .expect_err("disabled toolset must reject the call");
    assert_eq!(mcp_error_code(err), "toolset_disabled");

    let _ = client.cancel().await;
    let _ = server_task.await;
    Ok(())
}
