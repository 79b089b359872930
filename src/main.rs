//! Frontend delivery shim with colored request tracing.
//!
//! Features:
//! - Serves a pre-built single-page application from a static directory
//! - Forwards API-prefixed requests to a single upstream origin
//! - SPA fallback: unknown paths get the entry document, not a 404
//! - Detailed logging with color-coded request IDs and latency tracking

use axum::{Router, middleware};
use front_rs::{
    cli::Cli,
    config::{AppState, Config},
    handlers::dispatch,
    middleware::log_requests,
};
use std::sync::Arc;
use tracing::{Level, info};

/// Main entry point that configures and runs the server.
///
/// Sets up:
/// - Structured logging
/// - Immutable configuration from flags and environment
/// - A pooled upstream client with explicit timeouts
/// - The two-branch dispatcher behind the request logging middleware
#[tokio::main]
async fn main() {
    // Initialize structured logging with INFO level as default
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli: Cli = argh::from_env();
    let config = Config::from_cli(cli);

    let client = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.response_timeout)
        .build()
        .expect("Failed to build upstream HTTP client");

    let state = Arc::new(AppState { config, client });

    // Every request goes through the dispatcher; precedence of proxy over
    // static is decided there, not by route registration order.
    let app = Router::new()
        .fallback(dispatch)
        .layer(middleware::from_fn(log_requests))
        .with_state(state.clone());

    info!("Serving static files from: {:?}", state.config.static_dir);
    info!(
        "Proxying {}/* to: {}{}/",
        state.config.api_prefix, state.config.backend_url, state.config.forward_prefix
    );
    info!("Server running on: http://{}", state.config.bind);

    // Bind failure (port in use, permission denied) is the one fatal error.
    let listener = tokio::net::TcpListener::bind(state.config.bind)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.unwrap();
}
