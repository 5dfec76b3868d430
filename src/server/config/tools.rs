use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const TOOLSET_WEATHER: &str = "weather";
pub const TOOLSET_SQLITE: &str = "sqlite";

const KNOWN_TOOLSETS: &[&str] = &[TOOLSET_WEATHER, TOOLSET_SQLITE];

/// Enabled toolsets.
#[derive(Debug, Clone)]
pub struct ToolsSection {
    pub enabled: Vec<String>,
}

impl ToolsSection {
    /// Returns true if the named toolset is enabled.
    pub fn is_enabled(&self, toolset: &str) -> bool {
        self.enabled.iter().any(|name| name == toolset)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawToolsSection {
    pub enabled: Option<Vec<String>>,
}

pub fn parse_tools_section(
    raw: Option<RawToolsSection>,
    path: &Path,
) -> Result<ToolsSection, ConfigError> {
    let tools_raw = raw.unwrap_or_default();
    let enabled = tools_raw.enabled.unwrap_or_else(|| {
        KNOWN_TOOLSETS
            .iter()
            .map(|toolset| toolset.to_string())
            .collect()
    });

    for toolset in &enabled {
        if !KNOWN_TOOLSETS.contains(&toolset.as_str()) {
            return Err(ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "tools.enabled",
                message: format!(
                    "unknown toolset `{toolset}` (known: {})",
                    KNOWN_TOOLSETS.join(", ")
                ),
            });
        }
    }

    if enabled.is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "tools.enabled",
            message: "at least one toolset must be enabled".into(),
        });
    }

    Ok(ToolsSection { enabled })
}
