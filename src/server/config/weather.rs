use std::path::Path;

use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1/current.json";
pub const DEFAULT_WEATHER_LANG: &str = "en";
pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 30;

/// Weather toolset configuration.
#[derive(Debug, Clone)]
pub struct WeatherSection {
    pub api_base: String,
    pub lang: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawWeatherSection {
    pub api_base: Option<String>,
    pub lang: Option<String>,
    pub timeout_secs: Option<u64>,
}

pub fn parse_weather_section(
    raw: Option<RawWeatherSection>,
    path: &Path,
) -> Result<WeatherSection, ConfigError> {
    let weather_raw = raw.unwrap_or_default();

    let api_base = weather_raw
        .api_base
        .unwrap_or_else(|| DEFAULT_WEATHER_API_BASE.to_string());
    if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "weather.api_base",
            message: "must be an http(s) URL".into(),
        });
    }

    let lang = weather_raw
        .lang
        .unwrap_or_else(|| DEFAULT_WEATHER_LANG.to_string());
    if lang.trim().is_empty() {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "weather.lang",
            message: "must not be empty".into(),
        });
    }

    let timeout_secs = weather_raw
        .timeout_secs
        .unwrap_or(DEFAULT_WEATHER_TIMEOUT_SECS);
    if !(1..=300).contains(&timeout_secs) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "weather.timeout_secs",
            message: "use a timeout in the range 1-300 seconds".into(),
        });
    }

    Ok(WeatherSection {
        api_base,
        lang,
        timeout_secs,
    })
}
