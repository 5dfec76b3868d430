use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, paths};

pub const DEFAULT_MAX_ROWS: usize = 1000;
const MAX_MAX_ROWS: usize = 100_000;

/// SQLite toolset configuration.
#[derive(Debug, Clone)]
pub struct SqliteSection {
    pub db_path: PathBuf,
    pub export_dir: Option<PathBuf>,
    pub max_rows: usize,
}

#[derive(Debug, Deserialize)]
pub struct RawSqliteSection {
    pub db_path: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub max_rows: Option<usize>,
}

/// Parse the `[sqlite]` section. Required only when the sqlite toolset is
/// enabled; callers pass `required` accordingly.
pub fn parse_sqlite_section(
    raw: Option<RawSqliteSection>,
    path: &Path,
    required: bool,
) -> Result<Option<SqliteSection>, ConfigError> {
    let sqlite_raw = match raw {
        Some(raw) => raw,
        None if required => {
            return Err(ConfigError::MissingField {
                path: path.to_path_buf(),
                field: "sqlite",
            })
        }
        None => return Ok(None),
    };

    let db_path = sqlite_raw.db_path.ok_or(ConfigError::MissingField {
        path: path.to_path_buf(),
        field: "sqlite.db_path",
    })?;
    if !paths::is_nonempty_absolute(&db_path) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "sqlite.db_path",
            message: "must be an absolute path".into(),
        });
    }

    if let Some(export_dir) = &sqlite_raw.export_dir {
        if !paths::is_nonempty_absolute(export_dir) {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "sqlite.export_dir",
                message: "must be an absolute path".into(),
            });
        }
    }

    let max_rows = sqlite_raw.max_rows.unwrap_or(DEFAULT_MAX_ROWS);
    if !(1..=MAX_MAX_ROWS).contains(&max_rows) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "sqlite.max_rows",
            message: format!("use a row cap in the range 1-{MAX_MAX_ROWS}"),
        });
    }

    Ok(Some(SqliteSection {
        db_path,
        export_dir: sqlite_raw.export_dir,
        max_rows,
    }))
}
