//! Request logging middleware for the page routes.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Log each request before it is handled and its status after.
///
/// The remote address comes from the connection info installed by
/// `into_make_service_with_connect_info`; without it (e.g. in-process tests)
/// it is logged as "unknown". Requests and responses pass through untouched.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.to_string());

    tracing::info!(
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        "request started"
    );

    let started = Instant::now();
    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
