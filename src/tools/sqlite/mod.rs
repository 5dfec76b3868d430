//! SQLite MCP tools: ad-hoc queries and table-to-CSV export.

pub mod errors;
pub mod export;
pub mod query;

pub use errors::{
    export_validation_error_to_error_data, query_validation_error_to_error_data,
    runtime_error_to_error_data,
};
pub use export::{run_export, ExportRequestValidationError, ExportTableRequest, ExportTableResponse};
pub use query::{run_query, SqlQueryRequest, SqlQueryResponse, SqlRequestValidationError};

pub const SQL_QUERY_TOOL_ID: &str = "sql_query";
pub const EXPORT_TOOL_ID: &str = "export_table_to_csv";
