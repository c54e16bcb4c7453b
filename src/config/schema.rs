//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::log::Severity;

/// Root configuration for the monitor API service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Server, logging and bridge settings.
    pub server: ServerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:9997").
    pub bind_address: String,

    /// Minimum severity written by every logger.
    pub log_level: Severity,

    /// Write logs to files under `log_dir` instead of stdout.
    pub write_log: bool,

    /// Directory for the rotating and per-severity log files.
    pub log_dir: String,

    /// Start the websocket bridge after the HTTP server.
    pub enable_websocket: bool,

    /// Connect the websocket bridge to the node RPC.
    pub enable_rpc: bool,

    /// Node RPC endpoint.
    pub rpc: RpcConfig,

    /// Websocket endpoint.
    pub websocket: WebSocketConfig,

    /// Delay before the long async handler logs completion, in seconds.
    pub long_async_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9997".to_string(),
            log_level: Severity::Info,
            write_log: false,
            log_dir: crate::log::registry::DEFAULT_LOG_DIR.to_string(),
            enable_websocket: false,
            enable_rpc: false,
            rpc: RpcConfig::default(),
            websocket: WebSocketConfig::default(),
            long_async_delay_secs: 5,
        }
    }
}

/// Node RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// RPC endpoint address (e.g., "127.0.0.1:55027").
    pub url: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:55027".to_string(),
        }
    }
}

/// Websocket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Websocket endpoint URL.
    pub ws_url: String,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://127.0.0.1:8080/api".to_string(),
        }
    }
}
