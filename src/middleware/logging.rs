//! Request logging middleware
//!
//! Every request gets an `x-request-id` (taken from the caller when present)
//! which is echoed on the response and attached to the completion log line.

use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Log method, path, status and duration of each request
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = format!("{:.2}", started.elapsed().as_secs_f64() * 1000.0);

    if response.status().is_server_error() {
        warn!(%request_id, %method, %path, status, %duration_ms, "Request failed");
    } else {
        info!(%request_id, %method, %path, status, %duration_ms, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}
