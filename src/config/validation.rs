//! Configuration validation.
//!
//! Serde handles syntax; this checks the values make sense together and
//! reports every problem, not just the first.

use std::fmt;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let server = &config.server;
    let mut errors = Vec::new();

    if server.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("server.bind_address", "must not be empty"));
    }
    if server.write_log && server.log_dir.trim().is_empty() {
        errors.push(ValidationError::new("server.log_dir", "must not be empty when write_log is set"));
    }
    if server.enable_rpc && server.rpc.url.trim().is_empty() {
        errors.push(ValidationError::new("server.rpc.url", "must not be empty when enable_rpc is set"));
    }
    if server.enable_websocket {
        if server.websocket.ws_url.trim().is_empty() {
            errors.push(ValidationError::new(
                "server.websocket.ws_url",
                "must not be empty when enable_websocket is set",
            ));
        }
        if !server.enable_rpc {
            errors.push(ValidationError::new("server.enable_rpc", "the websocket bridge requires RPC"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
