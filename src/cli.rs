//! Command-line interface configuration.
//!
//! Every flag has a built-in default; `--port` and `--backend` additionally
//! fall back to the `PORT` and `BACKEND_URL` environment variables, so the
//! binary runs unconfigured inside a container.

use argh::FromArgs;
use std::path::PathBuf;

/// Fallback for `--port`: $PORT, then 8080.
pub fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

/// Fallback for `--backend`: $BACKEND_URL, then the compose-network default.
pub fn default_backend() -> String {
    std::env::var("BACKEND_URL").unwrap_or_else(|_| String::from("http://backend:8000"))
}

/// Static frontend host with an API reverse proxy
#[derive(Debug, FromArgs)]
pub struct Cli {
    /// path to the built frontend assets (default: 'dist')
    #[argh(option, long = "static-dir", default = "PathBuf::from(\"dist\")")]
    pub static_dir: PathBuf,

    /// upstream origin URL (default: $BACKEND_URL or 'http://backend:8000')
    #[argh(option, default = "default_backend()")]
    pub backend: String,

    /// API path prefix (default: '/api')
    #[argh(option, long = "api-prefix", default = "String::from(\"/api\")")]
    pub api_prefix: String,

    /// prefix the API prefix is rewritten to when forwarding
    /// (default: same as --api-prefix, i.e. identity rewrite)
    #[argh(option, long = "forward-prefix")]
    pub forward_prefix: Option<String>,

    /// listen port (default: $PORT or 8080)
    #[argh(option, default = "default_port()")]
    pub port: u16,

    /// upstream connect timeout in seconds (default: 10)
    #[argh(option, long = "connect-timeout", default = "10")]
    pub connect_timeout: u64,

    /// upstream response timeout in seconds (default: 30)
    #[argh(option, long = "response-timeout", default = "30")]
    pub response_timeout: u64,
}
