//! Error-to-ErrorData mapping for the weather tool.

use rmcp::model::ErrorData;
use serde_json::json;
use uuid::Uuid;

use crate::lib::errors::{ToolErrorDescriptor, WeatherError};

use super::request::WeatherRequestValidationError;

const INVALID_INPUT_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "invalid_request",
    "The query_weather request format is invalid",
    "Provide a non-empty city name of at most 100 characters.",
);
const KEY_MISSING_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "weather_key_missing",
    "WEATHER_API_KEY is not configured on the server",
    "Set WEATHER_API_KEY in the server environment and restart the MCP server.",
);
const API_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "weather_api_error",
    "The weather API rejected the request",
    "Check the city spelling and the API key quota, then retry.",
);
const REQUEST_FAILED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "weather_request_failed",
    "The weather API request could not be completed",
    "Check network connectivity from the server and retry.",
);
const BAD_PAYLOAD_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    "weather_bad_payload",
    "The weather API returned an undecodable payload",
    "Retry later; if the problem persists, verify weather.api_base in config.toml.",
);

pub fn validation_error_to_error_data(err: WeatherRequestValidationError) -> ErrorData {
    INVALID_INPUT_ERROR
        .builder()
        .retryable(false)
        .details(json!({ "details": err.to_string() }))
        .build()
        .expect("weather validation builder must succeed")
}

pub fn runtime_error_to_error_data(err: WeatherError, job_id: Uuid) -> ErrorData {
    let (descriptor, retryable, details) = match &err {
        WeatherError::MissingApiKey => (&KEY_MISSING_ERROR, false, json!({})),
        WeatherError::ApiStatus { status } => (&API_ERROR, *status >= 500, json!({ "status": status })),
        WeatherError::RequestFailed { message } => {
            (&REQUEST_FAILED_ERROR, true, json!({ "message": message }))
        }
        WeatherError::Timeout { timeout_secs } => (
            &REQUEST_FAILED_ERROR,
            true,
            json!({ "timeout_secs": timeout_secs }),
        ),
        WeatherError::BadPayload { message } => {
            (&BAD_PAYLOAD_ERROR, true, json!({ "message": message }))
        }
    };

    descriptor
        .builder()
        .retryable(retryable)
        .details(details)
        .with_context_field("job_id", json!(job_id.to_string()))
        .build()
        .expect("weather runtime builder must succeed")
}
