//! `export_table_to_csv` tool: dump a whole table as an RFC-4180 CSV file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rusqlite::{types::ValueRef, Connection};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    lib::{errors::SqlToolError, paths},
    server::config::SqliteSection,
};

/// Input for `export_table_to_csv`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExportTableRequest {
    /// Table to export. Must be a plain identifier.
    pub table: String,
    /// Absolute destination path for the CSV file.
    pub output_file: PathBuf,
}

impl ExportTableRequest {
    /// Validate the table identifier and the destination path against the
    /// configured export allowlist.
    pub fn validate(&self, section: &SqliteSection) -> Result<(), ExportRequestValidationError> {
        // The table name is interpolated into SQL, so it is restricted to a
        // plain identifier instead of being escaped.
        if !is_valid_identifier(&self.table) {
            return Err(ExportRequestValidationError::InvalidTableName {
                table: self.table.clone(),
            });
        }
        if !paths::is_nonempty_absolute(&self.output_file) {
            return Err(ExportRequestValidationError::OutputNotAbsolute {
                path: self.output_file.clone(),
            });
        }
        if let Some(export_dir) = &section.export_dir {
            if !paths::is_allowed_path(&self.output_file, std::slice::from_ref(export_dir)) {
                return Err(ExportRequestValidationError::OutputNotAllowed {
                    path: self.output_file.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Input validation errors for `export_table_to_csv`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportRequestValidationError {
    #[error("table `{table}` is not a valid identifier")]
    InvalidTableName { table: String },
    #[error("output_file `{path}` must be an absolute path")]
    OutputNotAbsolute { path: PathBuf },
    #[error("output_file `{path}` is outside sqlite.export_dir")]
    OutputNotAllowed { path: PathBuf },
}

/// Response from `export_table_to_csv`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExportTableResponse {
    pub table: String,
    pub rows: usize,
    pub file: String,
}

/// Export the table. Blocking; callers run it inside `spawn_blocking`.
pub fn run_export(
    section: &SqliteSection,
    table: &str,
    output_file: &Path,
) -> Result<ExportTableResponse, SqlToolError> {
    // Re-checked here so the write stays inside the allowlist even if a
    // caller skips request validation.
    if let Some(export_dir) = &section.export_dir {
        if !paths::is_allowed_path(output_file, std::slice::from_ref(export_dir)) {
            return Err(SqlToolError::PathNotAllowed {
                path: output_file.to_path_buf(),
            });
        }
    }

    let conn = Connection::open(&section.db_path).map_err(|err| SqlToolError::Open {
        path: section.db_path.clone(),
        message: err.to_string(),
    })?;

    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table}"))
        .map_err(|err| SqlToolError::Query {
            message: err.to_string(),
        })?;
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let column_count = columns.len();

    let mut body = String::new();
    body.push_str(&csv_record(columns.iter().map(String::as_str)));

    let mut rows = stmt.query([]).map_err(|err| SqlToolError::Query {
        message: err.to_string(),
    })?;
    let mut row_count = 0usize;
    while let Some(row) = rows.next().map_err(|err| SqlToolError::Query {
        message: err.to_string(),
    })? {
        let mut fields = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            let value = row.get_ref(idx).map_err(|err| SqlToolError::Internal {
                message: err.to_string(),
            })?;
            fields.push(render_csv_value(value));
        }
        body.push_str(&csv_record(fields.iter().map(String::as_str)));
        row_count += 1;
    }

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent).map_err(|source| SqlToolError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output_file, body).map_err(|source| SqlToolError::Io {
        path: output_file.to_path_buf(),
        source,
    })?;

    Ok(ExportTableResponse {
        table: table.to_string(),
        rows: row_count,
        file: output_file.to_string_lossy().into_owned(),
    })
}

fn render_csv_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned(),
        ValueRef::Blob(bytes) => hex::encode(bytes),
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// RFC-4180 line: quote fields containing separators, quotes, or newlines.
fn csv_record<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            line.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push_str("\r\n");
    line
}
