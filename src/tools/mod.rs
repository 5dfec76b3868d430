//! MCP tools registered on the server and helper functions for the router.

pub mod sqlite;
pub mod weather;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::model::ErrorData;
use serde_json::json;

use crate::lib::errors::ToolErrorDescriptor;

pub type ServerToolRouter<S> = ToolRouter<S>;

/// Helper for building a tool router.
pub fn build_router<S>(builder: impl FnOnce() -> ServerToolRouter<S>) -> ServerToolRouter<S>
where
    S: Send + Sync + 'static,
{
    builder()
}

const TOOLSET_DISABLED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "toolset_disabled",
    "The requested tool belongs to a disabled toolset",
    "Add the toolset to tools.enabled in config.toml and restart the MCP server.",
);

/// Build the error returned when a tool's toolset is not enabled.
pub fn toolset_disabled_error(toolset: &str) -> ErrorData {
    TOOLSET_DISABLED_ERROR
        .builder()
        .retryable(false)
        .details(json!({ "toolset": toolset }))
        .build()
        .expect("toolset_disabled builder must succeed")
}
