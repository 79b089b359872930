//! Request logging middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use nanoid::nanoid;
use std::time::Instant;
use tracing::info;

use crate::colors::tinted_id;

/// Assigns every request a short tinted ID and logs its arrival.
///
/// The ID and the arrival `Instant` are stored in request extensions so the
/// dispatcher can correlate its completion log line and report latency.
pub async fn log_requests(mut req: Request<Body>, next: Next) -> Response {
    let id = nanoid!(5);
    let method = req.method().clone();
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    req.extensions_mut().insert(id.clone());
    req.extensions_mut().insert(Instant::now());

    info!("{} → {} {}", tinted_id(&id), method, target);
    next.run(req).await
}
