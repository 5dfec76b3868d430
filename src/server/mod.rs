//! MCP server: authentication, configuration, and runtime.

pub mod auth;
pub mod config;
pub mod runtime;
