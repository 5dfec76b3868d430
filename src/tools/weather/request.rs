use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_CITY_LEN: usize = 100;

/// Input for `query_weather`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryWeatherRequest {
    /// City name in English (e.g. `Beijing`).
    pub city: String,
}

impl QueryWeatherRequest {
    /// Validate the input before issuing an upstream request.
    pub fn validate(&self) -> Result<(), WeatherRequestValidationError> {
        let city = self.city.trim();
        if city.is_empty() {
            return Err(WeatherRequestValidationError::MissingCity);
        }
        if city.chars().count() > MAX_CITY_LEN {
            return Err(WeatherRequestValidationError::CityTooLong {
                length: city.chars().count(),
            });
        }
        Ok(())
    }

    /// The trimmed city name used for the upstream query.
    pub fn city(&self) -> &str {
        self.city.trim()
    }
}

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeatherRequestValidationError {
    #[error("city is required")]
    MissingCity,
    #[error("city is too long ({length} characters, max {MAX_CITY_LEN})")]
    CityTooLong { length: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_city_is_rejected() {
        let request = QueryWeatherRequest { city: "   ".into() };
        assert_eq!(
            request.validate(),
            Err(WeatherRequestValidationError::MissingCity)
        );
    }

    #[test]
    fn oversized_city_is_rejected() {
        let request = QueryWeatherRequest {
            city: "x".repeat(101),
        };
        assert_eq!(
            request.validate(),
            Err(WeatherRequestValidationError::CityTooLong { length: 101 })
        );
    }

    #[test]
    fn city_is_trimmed_for_the_query() {
        let request = QueryWeatherRequest {
            city: " Beijing ".into(),
        };
        request.validate().expect("trimmed city should validate");
        assert_eq!(request.city(), "Beijing");
    }
}
