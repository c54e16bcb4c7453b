//! Startup orchestration.
//!
//! # Responsibilities
//! - Serve HTTP on the bound listener
//! - Start the websocket bridge when enabled, handing it the "ws" logger
//! - Report what happened to the bridge on the "server" logger

use std::error::Error;
use std::sync::Arc;
use std::thread;

use tokio::net::TcpListener;
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::config::{MonitorConfig, ServerConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::log::{LoggerRegistry, NamedLogger};

/// Logger used by the orchestrator itself.
pub const SERVER_LOGGER: &str = "server";
/// Logger handed to the bridge.
pub const BRIDGE_LOGGER: &str = "ws";

/// Websocket/RPC bridge that streams node data to monitoring clients.
///
/// Implementations live outside this crate; `start` may block for the
/// lifetime of the bridge.
pub trait Bridge: Send + Sync {
    fn start(
        &self,
        rpc_url: &str,
        ws_url: &str,
        logger: Arc<NamedLogger>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// What happened to the bridge during startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// `enable_websocket` is off.
    WebSocketDisabled,
    /// `enable_rpc` is off, so there is nothing to bridge to.
    RpcDisabled,
    /// Enabled in config but no bridge was linked into this binary.
    Unavailable,
    /// The bridge ran and returned without error.
    Finished,
    Failed(String),
    /// The server stopped while the bridge was still inside `start`.
    Running,
}

/// Start the bridge described by `config`, if any.
pub fn start_bridge(
    config: &ServerConfig,
    registry: &LoggerRegistry,
    bridge: Option<&dyn Bridge>,
) -> BridgeOutcome {
    let log = registry.get_logger(SERVER_LOGGER, false);

    if !config.enable_websocket {
        log.info("websocket bridge disabled", &[]);
        return BridgeOutcome::WebSocketDisabled;
    }
    if !config.enable_rpc {
        log.warn("start RPC service failed, enable_rpc is false", &[]);
        return BridgeOutcome::RpcDisabled;
    }
    let Some(bridge) = bridge else {
        log.warn("websocket bridge enabled but not available", &[]);
        return BridgeOutcome::Unavailable;
    };

    log.info("will start web socket on %s, rpc %s", &[&config.websocket.ws_url, &config.rpc.url]);
    let ws_logger = registry.get_logger(BRIDGE_LOGGER, false);
    match bridge.start(&config.rpc.url, &config.websocket.ws_url, ws_logger) {
        Ok(()) => BridgeOutcome::Finished,
        Err(e) => {
            log.errorln(&[&"websocket bridge failed:", &e]);
            BridgeOutcome::Failed(e.to_string())
        }
    }
}

/// Brings the service up: HTTP first, then the bridge.
pub struct Startup {
    config: MonitorConfig,
    registry: Arc<LoggerRegistry>,
    bridge: Option<Arc<dyn Bridge>>,
}

impl Startup {
    pub fn new(config: MonitorConfig, registry: Arc<LoggerRegistry>) -> Self {
        Self {
            config,
            registry,
            bridge: None,
        }
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn Bridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Serve until `shutdown` fires.
    ///
    /// The bridge runs on its own detached thread alongside the server and is
    /// not waited for: once serving ends, a bridge that is still blocked in
    /// `start` is reported as [`BridgeOutcome::Running`].
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<BridgeOutcome, std::io::Error> {
        let server = HttpServer::new(&self.config.server, &self.registry);
        let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

        let config = self.config.server.clone();
        let registry = Arc::clone(&self.registry);
        let bridge = self.bridge.clone();
        let (tx, mut settled) = oneshot::channel();
        thread::Builder::new()
            .name("ws-bridge".to_string())
            .spawn(move || {
                let outcome = start_bridge(&config, &registry, bridge.as_deref());
                tracing::info!(outcome = ?outcome, "Websocket bridge settled");
                let _ = tx.send(outcome);
            })?;

        let served = match serving.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        };

        let outcome = match settled.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => BridgeOutcome::Running,
            Err(TryRecvError::Closed) => BridgeOutcome::Failed("bridge thread exited without a result".to_string()),
        };
        served.map(|()| outcome)
    }
}
