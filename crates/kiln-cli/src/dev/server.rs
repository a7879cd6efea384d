//! Preview server with live reload via Server-Sent Events.
//!
//! Serves the project base directory from disk and pushes reload
//! notifications to connected browser clients. Served HTML gets the reload
//! client script injected before `</body>`.

use crate::dev::{ServeConfig, SharedState};
use crate::error::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response, Sse},
    routing::get,
    Router,
};
use std::path::PathBuf;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tower_http::cors::{Any, CorsLayer};

/// Preview server.
pub struct DevServer {
    /// Server configuration
    config: ServeConfig,
    /// Shared application state
    state: SharedState,
}

impl DevServer {
    /// Create a new preview server.
    pub fn new(config: ServeConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Start the server. Runs until the process exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind to the configured address.
    pub async fn start(self) -> Result<()> {
        let addr = self.config.addr;
        let server_url = self.config.server_url();

        let app = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            crate::error::CliError::Server(format!("Failed to bind to {}: {}", addr, e))
        })?;

        crate::ui::success(&format!("Preview server running at {}", server_url));

        axum::serve(listener, app)
            .await
            .map_err(|e| crate::error::CliError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Build the axum router with all routes.
    fn build_router(self) -> Router {
        let state = self.state.clone();

        Router::new()
            // SSE endpoint for reload events
            .route("/__kiln_sse__", get(handle_sse))
            // Reload client script
            .route("/__kiln_reload__.js", get(handle_reload_script))
            // Favicon handler to prevent 404s
            .route("/favicon.ico", get(handle_favicon))
            // Everything else is served from the base directory
            .fallback(handle_request)
            .layer(
                // CORS: allow all origins, this is a dev-only server
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }
}

/// Handle SSE connections for reload events.
async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<
    impl tokio_stream::Stream<Item = Result<axum::response::sse::Event, std::convert::Infallible>>,
> {
    use axum::response::sse::Event;

    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "client connected via SSE");

    state
        .broadcast(&crate::dev::DevEvent::ClientConnected { id })
        .await;

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> impl IntoResponse {
    const RELOAD_SCRIPT: &str = include_str!("../../assets/dev/reload-client.js");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/javascript")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(RELOAD_SCRIPT))
        .unwrap()
}

/// Handle favicon requests with 204 No Content.
async fn handle_favicon() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// Serve a file from the base directory, injecting the reload script into
/// HTML responses.
async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    let file_path = match resolve_request_path(state.base_dir(), path) {
        Some(file_path) => file_path,
        None => return not_found(path),
    };

    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = determine_content_type(&file_path.to_string_lossy());
            let body = if content_type.starts_with("text/html") {
                inject_reload_script(&content, content_type)
            } else {
                content
            };

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from(body))
                .unwrap()
        }
        Err(_) => not_found(path),
    }
}

/// Map a request path onto the base directory.
///
/// `/` becomes `index.html`; path traversal out of the base directory is
/// rejected.
fn resolve_request_path(base_dir: &std::path::Path, path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let relative = if trimmed.is_empty() {
        "index.html"
    } else {
        trimmed
    };

    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    let file_path = base_dir.join(relative);
    (file_path.is_file()).then_some(file_path)
}

fn not_found(path: &str) -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(format!("File not found: {}", path)))
        .unwrap()
}

/// Inject the reload client script before the closing </body> tag.
fn inject_reload_script(content: &[u8], content_type: &str) -> Vec<u8> {
    if !content_type.starts_with("text/html") {
        return content.to_vec();
    }

    let html = String::from_utf8_lossy(content);
    let script_tag = r#"<script src="/__kiln_reload__.js"></script>"#;

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 10);
        result.push_str(&html[..pos]);
        result.push_str("\n  ");
        result.push_str(script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    // Fallback: append at end
    let mut result = html.to_string();
    result.push('\n');
    result.push_str(script_tag);
    result.into_bytes()
}

/// Determine content type from file extension.
fn determine_content_type(path: &str) -> &'static str {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_reload_script_with_body() {
        let html = b"<html><body><h1>Test</h1></body></html>";
        let result = inject_reload_script(html, "text/html");

        let result_str = String::from_utf8(result).unwrap();
        assert!(result_str.contains(r#"<script src="/__kiln_reload__.js"></script>"#));

        // Script lands before </body>
        let script_pos = result_str.find("__kiln_reload__").unwrap();
        let body_pos = result_str.find("</body>").unwrap();
        assert!(script_pos < body_pos);
    }

    #[test]
    fn test_inject_reload_script_without_body() {
        let html = b"<html><h1>Test</h1></html>";
        let result = inject_reload_script(html, "text/html");
        let result_str = String::from_utf8(result).unwrap();
        assert!(result_str.contains("__kiln_reload__"));
    }

    #[test]
    fn test_inject_skips_non_html() {
        let js = b"console.log('test');";
        let result = inject_reload_script(js, "application/javascript");
        assert_eq!(result, js);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_request_path(dir.path(), "/../etc/passwd").is_none());
    }

    #[test]
    fn test_resolve_root_maps_to_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        let resolved = resolve_request_path(dir.path(), "/").unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(determine_content_type("a.css"), "text/css");
        assert_eq!(determine_content_type("a.js"), "application/javascript");
        assert_eq!(determine_content_type("a.html"), "text/html; charset=utf-8");
        assert_eq!(determine_content_type("a.bin"), "application/octet-stream");
    }
}
