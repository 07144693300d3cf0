//! Per-request logging middleware.
//!
//! Each request gets an id (the incoming `x-request-id`, or a fresh uuid),
//! which prefixes the entry/exit log lines and is echoed in the response.

use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

pub async fn log_requests(mut req: Request, next: Next) -> Response {
    let started = Instant::now();

    let id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let header = HeaderValue::from_str(&id).ok();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    log::info!("[{id}] → {method} {path}");

    if let Some(value) = &header {
        req.headers_mut().insert(X_REQUEST_ID, value.clone());
    }

    let mut response = next.run(req).await;

    log::info!(
        "[{id}] ← {} {method} {path} ({} ms)",
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    if let Some(value) = header {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
