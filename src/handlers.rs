//! HTTP request handlers.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use owo_colors::OwoColorize;
use percent_encoding::percent_decode_str;
use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use tokio::fs;
use tracing::{error, info};

use crate::colors::tinted_id;
use crate::config::AppState;

/// Body of every proxy failure response.
pub const PROXY_ERROR_BODY: &str = "Proxy error";

/// Routes every incoming request to exactly one of the two branches.
///
/// The proxy prefix always wins: a path under it is forwarded even if a file
/// with the same name happens to exist under the static root.
pub async fn dispatch(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    if state.config.is_api_path(req.uri().path()) {
        proxy_api(&state, req).await
    } else {
        serve_static(&state, req).await
    }
}

/// Forwards a request to the upstream origin and relays its response.
///
/// Method, body and query string pass through unchanged; the path gets the
/// configured prefix rewrite (identity by default). Hop-by-hop headers are
/// stripped in both directions, and the upstream body is streamed back
/// rather than buffered.
async fn proxy_api(state: &AppState, req: Request<Body>) -> Response {
    let (id, start_time) = request_context(&req);
    let (parts, body) = req.into_parts();
    let url = state
        .config
        .forward_url(parts.uri.path(), parts.uri.query());

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("{} failed to read request body: {}", tinted_id(&id), e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    // Dropping the original Host header lets the client derive it from the
    // target URL ("change origin"); the rest are hop-by-hop.
    let mut filtered_headers = HeaderMap::new();
    for (key, value) in parts.headers.iter() {
        if !matches!(
            key.as_str(),
            "host" | "accept-encoding" | "connection" | "keep-alive"
        ) {
            filtered_headers.insert(key.clone(), value.clone());
        }
    }

    info!("{} → {} {}", tinted_id(&id), "PROXY".yellow(), url);
    let upstream_start = Instant::now();

    let upstream = match state
        .client
        .request(parts.method.clone(), &url)
        .headers(filtered_headers)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            error!("{} ✗ {} {}: {}", tinted_id(&id), "PROXY".yellow(), url, e);
            return proxy_error();
        }
    };

    info!(
        "{} ← {} {} ({}ms)",
        tinted_id(&id),
        "PROXY".yellow(),
        upstream.status(),
        upstream_start.elapsed().as_millis()
    );

    let mut builder = Response::builder().status(upstream.status());
    for (key, value) in upstream.headers().iter() {
        if !matches!(
            key.as_str(),
            "transfer-encoding" | "content-encoding" | "connection" | "keep-alive"
        ) {
            builder = builder.header(key, value);
        }
    }

    info!(
        "{} ← {} {} ({}ms)",
        tinted_id(&id),
        parts.method,
        upstream.status(),
        start_time.elapsed().as_millis()
    );

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap_or_else(|_| proxy_error())
}

/// Serves a file from the static root, or the SPA entry document.
///
/// Any path that does not resolve to a real file gets index.html with a 200,
/// so client-side routes survive a full-page reload. Only a missing entry
/// document itself produces a 404.
async fn serve_static(state: &AppState, req: Request<Body>) -> Response {
    let (id, start_time) = request_context(&req);
    let static_dir = &state.config.static_dir;

    if let Some(file_path) = resolve_file(static_dir, req.uri().path()) {
        if let Ok(content) = fs::read(&file_path).await {
            info!(
                "{} ← {} {} ({}ms)",
                tinted_id(&id),
                "STATIC".green(),
                StatusCode::OK,
                start_time.elapsed().as_millis()
            );
            return file_response(&file_path, content);
        }
    }

    let index = static_dir.join("index.html");
    match fs::read(&index).await {
        Ok(content) => {
            info!(
                "{} ← {} {} ({}ms)",
                tinted_id(&id),
                "SPA".green(),
                StatusCode::OK,
                start_time.elapsed().as_millis()
            );
            file_response(&index, content)
        }
        Err(e) => {
            error!(
                "{} entry document missing at {:?}: {}",
                tinted_id(&id),
                index,
                e
            );
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Request ID and arrival time placed in extensions by the logging layer.
fn request_context(req: &Request<Body>) -> (String, Instant) {
    let id = req.extensions().get::<String>().cloned().unwrap_or_default();
    let start = req
        .extensions()
        .get::<Instant>()
        .copied()
        .unwrap_or_else(Instant::now);
    (id, start)
}

/// Maps a request path to an existing file under the static root.
///
/// The path is percent-decoded first, so "/my%20file.txt" finds
/// "my file.txt". Directory paths resolve to their index.html. Paths with
/// `..` or other non-normal components never resolve, even when the dots
/// arrive encoded, so a request cannot escape the root.
fn resolve_file(static_dir: &Path, path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let mut file_path = static_dir.join(relative);
    if file_path.is_dir() {
        file_path.push("index.html");
    }
    file_path.is_file().then_some(file_path)
}

fn file_response(path: &Path, content: Vec<u8>) -> Response {
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();
    let mut response = Response::new(Body::from(content));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime_type.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    response
}

fn proxy_error() -> Response {
    let mut response = Response::new(Body::from(PROXY_ERROR_BODY));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_file_finds_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

        let resolved = resolve_file(dir.path(), "/app.js").unwrap();
        assert_eq!(resolved, dir.path().join("app.js"));
    }

    #[test]
    fn test_resolve_file_directory_gets_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>shell</html>").unwrap();

        let resolved = resolve_file(dir.path(), "/").unwrap();
        assert_eq!(resolved, dir.path().join("index.html"));
    }

    #[test]
    fn test_resolve_file_misses_return_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_file(dir.path(), "/missing.js").is_none());
    }

    #[test]
    fn test_resolve_file_decodes_percent_encoding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my file.txt"), "spaced").unwrap();

        let resolved = resolve_file(dir.path(), "/my%20file.txt").unwrap();
        assert_eq!(resolved, dir.path().join("my file.txt"));
    }

    #[test]
    fn test_resolve_file_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("secret.txt");
        std::fs::write(&outside, "secret").unwrap();
        let root = dir.path().join("dist");
        std::fs::create_dir(&root).unwrap();

        assert!(resolve_file(&root, "/../secret.txt").is_none());
        // Encoded dots must not slip past the component check
        assert!(resolve_file(&root, "/%2e%2e/secret.txt").is_none());
        assert!(resolve_file(&root, "/..%2fsecret.txt").is_none());
    }

    #[test]
    fn test_resolve_file_invalid_utf8_never_resolves() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "x").unwrap();

        assert!(resolve_file(dir.path(), "/%ff%fe").is_none());
    }
}
