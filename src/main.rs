//! Monitor API (v0.1)
//!
//! # Architecture Overview
//!
//! ```text
//!   monitor.toml ──▶ config ──▶ LoggerRegistry ──┬──▶ "api-handlers" ──▶ http handlers
//!                                                ├──▶ "server"       ──▶ startup
//!                                                └──▶ "ws"           ──▶ websocket bridge
//!
//!   each logger ──▶ stdout                         (console mode)
//!               └─▶ stderr + <dir>/monitor-api-all.log (rotating JSON)
//!                          + <dir>/{debug,info,warn,error,fatal}.log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use monitor_api::config::{load_config, MonitorConfig};
use monitor_api::lifecycle::{Shutdown, Startup};
use monitor_api::log::{self, LogSettings};

#[derive(Parser)]
#[command(name = "monitor-api")]
#[command(about = "HTTP monitor API with per-module file logging", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "monitor_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.server.bind_address,
        log_level = %config.server.log_level,
        write_log = config.server.write_log,
        enable_websocket = config.server.enable_websocket,
        "Configuration loaded"
    );

    log::init(LogSettings::from_config(&config.server));
    let registry = Arc::clone(log::global());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let outcome = Startup::new(config, registry).run(listener, &shutdown).await?;
    tracing::info!(bridge = ?outcome, "Shutdown complete");
    Ok(())
}
