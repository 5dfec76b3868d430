//! Upstream HTTP fetch for `query_weather`.

use std::{env, time::Duration};

use tracing::info;

use crate::{lib::errors::WeatherError, server::config::WeatherSection};

use super::format::WeatherPayload;

/// Environment variable holding the upstream API key. Kept out of
/// config.toml so the file can be committed.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";

const USER_AGENT: &str = concat!("tenki-mcp/", env!("CARGO_PKG_VERSION"));

/// Fetch the current weather for `city` from the configured API.
pub async fn fetch_weather(
    http: &reqwest::Client,
    config: &WeatherSection,
    city: &str,
) -> Result<WeatherPayload, WeatherError> {
    let api_key = env::var(WEATHER_API_KEY_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(WeatherError::MissingApiKey)?;

    info!(
        target: "tenki_mcp::weather",
        city = city,
        api_base = %config.api_base,
        lang = %config.lang,
        "Fetching current weather"
    );

    let response = http
        .get(&config.api_base)
        .query(&[
            ("q", city),
            ("key", api_key.as_str()),
            ("lang", config.lang.as_str()),
        ])
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(|err| {
            if err.is_timeout() {
                WeatherError::Timeout {
                    timeout_secs: config.timeout_secs,
                }
            } else {
                WeatherError::RequestFailed {
                    message: err.to_string(),
                }
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(WeatherError::ApiStatus {
            status: status.as_u16(),
        });
    }

    response
        .json::<WeatherPayload>()
        .await
        .map_err(|err| WeatherError::BadPayload {
            message: err.to_string(),
        })
}
