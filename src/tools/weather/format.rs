//! Weather payload decoding and user-facing formatting.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Upstream payload shape (weatherapi.com `current.json`). Every field is
/// optional; partial payloads render with `N/A` fills instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherPayload {
    pub location: Option<LocationPayload>,
    pub current: Option<CurrentPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationPayload {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentPayload {
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub condition: Option<ConditionPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConditionPayload {
    pub text: Option<String>,
}

/// Response from `query_weather`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct QueryWeatherResponse {
    pub city: String,
    pub country: String,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub condition: String,
    /// Rendered multi-line report.
    pub summary: String,
}

/// Convert the upstream payload into the tool response.
pub fn build_response(payload: WeatherPayload) -> QueryWeatherResponse {
    let location = payload.location.unwrap_or_default();
    let current = payload.current.unwrap_or_default();

    let city = location.name.unwrap_or_else(|| "unknown".to_string());
    let country = location.country.unwrap_or_else(|| "unknown".to_string());
    let condition = current
        .condition
        .and_then(|c| c.text)
        .unwrap_or_else(|| "unknown".to_string());

    let summary = format!(
        "{city}, {country}\nTemperature: {temp}\nHumidity: {humidity}\nWind: {wind}\nCondition: {condition}",
        temp = format_metric(current.temp_c, "°C"),
        humidity = format_metric(current.humidity, "%"),
        wind = format_metric(current.wind_kph, " km/h"),
    );

    QueryWeatherResponse {
        city,
        country,
        temp_c: current.temp_c,
        humidity: current.humidity,
        wind_kph: current.wind_kph,
        condition,
        summary,
    }
}

fn format_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{value}{unit}"),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> WeatherPayload {
        serde_json::from_value(serde_json::json!({
            "location": { "name": "Beijing", "country": "China" },
            "current": {
                "temp_c": 24.5,
                "humidity": 60.0,
                "wind_kph": 12.0,
                "condition": { "text": "Sunny" }
            }
        }))
        .expect("payload fixture should decode")
    }

    #[test]
    fn full_payload_renders_all_lines() {
        let response = build_response(full_payload());

        assert_eq!(response.city, "Beijing");
        assert_eq!(response.country, "China");
        assert_eq!(response.temp_c, Some(24.5));
        assert_eq!(response.condition, "Sunny");
        assert_eq!(
            response.summary,
            "Beijing, China\nTemperature: 24.5°C\nHumidity: 60%\nWind: 12 km/h\nCondition: Sunny"
        );
    }

    #[test]
    fn partial_payload_fills_missing_fields() {
        let payload: WeatherPayload = serde_json::from_value(serde_json::json!({
            "location": { "name": "Beijing" }
        }))
        .expect("partial payload should decode");

        let response = build_response(payload);
        assert_eq!(response.city, "Beijing");
        assert_eq!(response.country, "unknown");
        assert_eq!(response.temp_c, None);
        assert!(response.summary.contains("Temperature: N/A"));
        assert!(response.summary.contains("Condition: unknown"));
    }

    #[test]
    fn empty_payload_still_builds_a_summary() {
        let response = build_response(WeatherPayload::default());
        assert_eq!(response.city, "unknown");
        assert!(response.summary.starts_with("unknown, unknown"));
    }
}
