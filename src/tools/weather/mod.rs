//! `query_weather` MCP tool: request validation, HTTP fetch, formatting.

pub mod errors;
pub mod fetch;
pub mod format;
pub mod request;

pub use errors::{runtime_error_to_error_data, validation_error_to_error_data};
pub use fetch::{fetch_weather, WEATHER_API_KEY_ENV};
pub use format::{build_response, QueryWeatherResponse, WeatherPayload};
pub use request::{QueryWeatherRequest, WeatherRequestValidationError};

pub const WEATHER_TOOL_ID: &str = "query_weather";
