//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener and stop on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handlers;
use crate::log::{LoggerRegistry, NamedLogger};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub logger: Arc<NamedLogger>,
    pub long_async_delay: Duration,
}

/// HTTP server for the monitor API.
pub struct HttpServer {
    router: Router,
    logger: Arc<NamedLogger>,
}

impl HttpServer {
    /// Create a new HTTP server; handler logging goes through `registry`.
    pub fn new(config: &ServerConfig, registry: &LoggerRegistry) -> Self {
        let logger = registry.get_logger(handlers::LOGGER_NAME, false);
        let state = AppState {
            logger: Arc::clone(&logger),
            long_async_delay: Duration::from_secs(config.long_async_delay_secs),
        };

        Self {
            router: Self::build_router(state),
            logger,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/ping", get(handlers::ping))
            .route("/ping/{*rest}", get(handlers::ping))
            .route("/pong", get(handlers::pong))
            .route("/pong/{*rest}", get(handlers::pong))
            .route("/kong", get(handlers::kong))
            .route("/kong/{*rest}", get(handlers::kong))
            .route("/long_async", get(handlers::long_async))
            .route("/long_async/{*rest}", get(handlers::long_async))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");
        self.logger.info("listening on %s", &[&addr]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
