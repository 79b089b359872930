//! Immutable server configuration.
//!
//! Built once at startup from CLI flags and environment variables, then
//! shared read-only behind `Arc`. Handlers never look at the environment.

use std::{
    net::SocketAddr,
    path::PathBuf,
    time::Duration,
};

use crate::cli::Cli;

/// Process-wide configuration, fixed after startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the server binds, always all interfaces
    pub bind: SocketAddr,
    /// Base URL of the upstream origin, no trailing slash (e.g. "http://backend:8000")
    pub backend_url: String,
    /// Request paths under this prefix are proxied (e.g. "/api")
    pub api_prefix: String,
    /// What `api_prefix` becomes on the outbound path; equals `api_prefix`
    /// unless a rewrite was configured
    pub forward_prefix: String,
    /// Root directory for static file serving
    pub static_dir: PathBuf,
    /// Upstream connect timeout
    pub connect_timeout: Duration,
    /// Upstream full-response timeout
    pub response_timeout: Duration,
}

/// Shared application state accessible to all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    /// Pooled upstream client, built once with the configured timeouts
    pub client: reqwest::Client,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Self {
        // Missing scheme is tolerated the way the upstream hostname is:
        // anything else malformed fails lazily on the first proxied request.
        let backend_url = if cli.backend.starts_with("http") {
            cli.backend
        } else {
            format!("http://{}", cli.backend)
        };
        let api_prefix = normalize_prefix(&cli.api_prefix);
        let forward_prefix = cli
            .forward_prefix
            .as_deref()
            .map(normalize_prefix)
            .unwrap_or_else(|| api_prefix.clone());

        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], cli.port)),
            backend_url: backend_url.trim_end_matches('/').to_string(),
            api_prefix,
            forward_prefix,
            static_dir: cli.static_dir,
            connect_timeout: Duration::from_secs(cli.connect_timeout),
            response_timeout: Duration::from_secs(cli.response_timeout),
        }
    }

    /// Whether a request path belongs to the proxy.
    ///
    /// Segment-aware, like an Express mount point: "/api" and "/api/users"
    /// match, "/apifoo" does not.
    pub fn is_api_path(&self, path: &str) -> bool {
        match path.strip_prefix(self.api_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Builds the outbound URL for a proxied request, applying the prefix
    /// rewrite (identity by default) and carrying the query string unchanged.
    pub fn forward_url(&self, path: &str, query: Option<&str>) -> String {
        let rest = path.strip_prefix(self.api_prefix.as_str()).unwrap_or(path);
        let url = format!("{}{}{}", self.backend_url, self.forward_prefix, rest);
        match query {
            Some(q) => format!("{url}?{q}"),
            None => url,
        }
    }
}

/// Leading slash on, trailing slash off.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
