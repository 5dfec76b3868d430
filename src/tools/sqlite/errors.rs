//! Error-to-ErrorData mapping for the SQLite tools.

use rmcp::model::ErrorData;
use serde_json::json;
use uuid::Uuid;

use crate::lib::errors::{SqlToolError, ToolErrorDescriptor};

use super::{export::ExportRequestValidationError, query::SqlRequestValidationError};

const INVALID_INPUT_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "invalid_request",
    "The SQLite tool request format is invalid",
    "Check the constraints for query length, table identifiers, and output paths.",
);
const PATH_NOT_ALLOWED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "path_not_allowed",
    "output_file is outside the allowed export directory",
    "Update sqlite.export_dir in config.toml or choose a path under it.",
);
const SQL_FAILED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "sql_failed",
    "The SQLite engine rejected the statement",
    "Review the SQL against the database schema and retry.",
);
const IO_FAILED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "io_failed",
    "Writing the export file failed",
    "Check permissions and free space under sqlite.export_dir.",
);
const DB_OPEN_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "db_open_failed",
    "The configured SQLite database could not be opened",
    "Verify sqlite.db_path in config.toml and restart the MCP server.",
);

pub fn query_validation_error_to_error_data(err: SqlRequestValidationError) -> ErrorData {
    INVALID_INPUT_ERROR
        .builder()
        .retryable(false)
        .details(json!({ "details": err.to_string() }))
        .build()
        .expect("sql validation builder must succeed")
}

pub fn export_validation_error_to_error_data(err: ExportRequestValidationError) -> ErrorData {
    let descriptor = match &err {
        ExportRequestValidationError::OutputNotAllowed { .. } => &PATH_NOT_ALLOWED_ERROR,
        _ => &INVALID_INPUT_ERROR,
    };
    descriptor
        .builder()
        .retryable(false)
        .details(json!({ "details": err.to_string() }))
        .build()
        .expect("export validation builder must succeed")
}

pub fn runtime_error_to_error_data(err: SqlToolError, job_id: Uuid) -> ErrorData {
    let (descriptor, retryable, details) = match &err {
        SqlToolError::Open { path, message } => (
            &DB_OPEN_ERROR,
            false,
            json!({ "path": path.to_string_lossy(), "message": message }),
        ),
        SqlToolError::Query { message } => (&SQL_FAILED_ERROR, false, json!({ "message": message })),
        SqlToolError::PathNotAllowed { path } => (
            &PATH_NOT_ALLOWED_ERROR,
            false,
            json!({ "path": path.to_string_lossy() }),
        ),
        SqlToolError::Io { path, source } => (
            &IO_FAILED_ERROR,
            true,
            json!({ "path": path.to_string_lossy(), "message": source.to_string() }),
        ),
        SqlToolError::Internal { message } => {
            (&SQL_FAILED_ERROR, false, json!({ "message": message }))
        }
    };

    descriptor
        .builder()
        .retryable(retryable)
        .details(details)
        .with_context_field("job_id", json!(job_id.to_string()))
        .build()
        .expect("sqlite runtime builder must succeed")
}
