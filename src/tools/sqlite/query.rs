//! `sql_query` tool: run an ad-hoc statement against the configured database.

use rusqlite::{types::ValueRef, Connection};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::{lib::errors::SqlToolError, server::config::SqliteSection};

const MAX_QUERY_LEN: usize = 10_000;

/// Input for `sql_query`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SqlQueryRequest {
    /// SQL statement to execute against the configured SQLite database.
    pub query: String,
}

impl SqlQueryRequest {
    pub fn validate(&self) -> Result<(), SqlRequestValidationError> {
        if self.query.trim().is_empty() {
            return Err(SqlRequestValidationError::MissingQuery);
        }
        if self.query.len() > MAX_QUERY_LEN {
            return Err(SqlRequestValidationError::QueryTooLong {
                length: self.query.len(),
            });
        }
        Ok(())
    }
}

/// Input validation errors for `sql_query`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SqlRequestValidationError {
    #[error("query is required")]
    MissingQuery,
    #[error("query is too long ({length} bytes, max {MAX_QUERY_LEN})")]
    QueryTooLong { length: usize },
}

/// Response from `sql_query`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SqlQueryResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    /// True when the result was cut at `sqlite.max_rows`.
    pub truncated: bool,
}

/// Execute the statement and fetch all rows, capped at `max_rows`.
///
/// Blocking; callers run it inside `spawn_blocking`.
pub fn run_query(section: &SqliteSection, query: &str) -> Result<SqlQueryResponse, SqlToolError> {
    let conn = Connection::open(&section.db_path).map_err(|err| SqlToolError::Open {
        path: section.db_path.clone(),
        message: err.to_string(),
    })?;

    let mut stmt = conn.prepare(query).map_err(|err| SqlToolError::Query {
        message: err.to_string(),
    })?;
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let column_count = columns.len();

    let mut rows = stmt.query([]).map_err(|err| SqlToolError::Query {
        message: err.to_string(),
    })?;

    let mut out = Vec::new();
    let mut truncated = false;
    loop {
        let row = match rows.next().map_err(|err| SqlToolError::Query {
            message: err.to_string(),
        })? {
            Some(row) => row,
            None => break,
        };
        if out.len() >= section.max_rows {
            truncated = true;
            break;
        }
        let mut json_row = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let value = row.get_ref(idx).map_err(|err| SqlToolError::Internal {
                message: err.to_string(),
            })?;
            json_row.push(value_ref_to_json(value));
        }
        out.push(json_row);
    }

    let row_count = out.len();
    Ok(SqlQueryResponse {
        columns,
        rows: out,
        row_count,
        truncated,
    })
}

/// Convert a SQLite value into JSON. BLOBs render as hex strings.
pub fn value_ref_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(Number::from(i)),
        ValueRef::Real(f) => Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}
