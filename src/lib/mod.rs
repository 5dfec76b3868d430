//! Shared helpers: errors, telemetry, and path validation.

pub mod errors;
pub mod paths;
pub mod telemetry;
