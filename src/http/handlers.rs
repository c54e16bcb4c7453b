//! Diagnostic endpoints.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::{Local, Timelike};
use serde_json::json;

use crate::http::server::AppState;
use crate::infof;

/// Name of the logger shared by the handlers.
pub const LOGGER_NAME: &str = "api-handlers";

/// `200 {"message": "ping<path>"}`.
pub async fn ping(uri: Uri) -> impl IntoResponse {
    Json(json!({ "message": format!("ping{}", uri.path()) }))
}

/// `204`, no body.
pub async fn pong() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Plain-text `Kong<path>`, logging the size written with both calling
/// conventions.
pub async fn kong(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let body = format!("Kong{}", uri.path());
    let written = body.len();

    infof!(state.logger, "info is %v and time now %v", written, Local::now());
    state
        .logger
        .infoln(&[&"info is", &written, &Local::now().nanosecond()]);

    body
}

/// Returns immediately; a background task logs completion after the
/// configured delay.
pub async fn long_async(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let path = uri.path().to_string();
    let logger = state.logger.clone();
    let delay = state.long_async_delay;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        logger.print("Done! in path %v", &[&path]);
    });

    StatusCode::OK
}
