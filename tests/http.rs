//! HTTP endpoints and the logging they produce.

use std::sync::Arc;
use std::time::Duration;

use monitor_api::config::ServerConfig;
use monitor_api::http::HttpServer;
use monitor_api::lifecycle::Shutdown;
use monitor_api::log::sink::Encoding;
use monitor_api::log::{LogSettings, LoggerRegistry};

mod common;

use common::Captured;

struct Running {
    base: String,
    out: Captured,
    shutdown: Shutdown,
}

async fn start_server() -> Running {
    let out = Captured::default();
    let registry = Arc::new(LoggerRegistry::new(LogSettings::default()).with_console(out.sink(Encoding::Json)));
    let config = ServerConfig {
        long_async_delay_secs: 0,
        ..ServerConfig::default()
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, &registry);
    tokio::spawn(server.run(listener, shutdown.subscribe()));

    Running { base, out, shutdown }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_ping_and_pong() {
    let server = start_server().await;

    let res = client().get(format!("{}/ping/abc", server.base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "ping/ping/abc");

    let res = client().get(format!("{}/pong", server.base)).send().await.unwrap();
    assert_eq!(res.status(), 204);
    assert!(res.bytes().await.unwrap().is_empty());

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_kong_logs_with_both_conventions() {
    let server = start_server().await;

    let res = client().get(format!("{}/kong/x", server.base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "Kong/kong/x");

    let lines: Vec<_> = server
        .out
        .json_lines()
        .into_iter()
        .filter(|l| l["logger"] == "api-handlers" && l["msg"].as_str().unwrap().starts_with("info is"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0]["msg"].as_str().unwrap().starts_with("info is 11 and time now "));
    assert!(lines[1]["msg"].as_str().unwrap().starts_with("info is 11 "));
    assert!(lines.iter().all(|l| l["file"].as_str().unwrap().ends_with("handlers.rs")));

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_long_async_logs_later() {
    let server = start_server().await;

    let res = client().get(format!("{}/long_async/job", server.base)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let mut found = false;
    for _ in 0..50 {
        if server.out.text().contains("Done! in path /long_async/job") {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(found, "completion was never logged");

    server.shutdown.trigger();
}
