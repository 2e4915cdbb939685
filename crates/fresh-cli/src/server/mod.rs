//! HTTP front end: every request waits for a rebuild check, then is served
//! straight from disk.
//!
//! The router has a single fallback handler:
//!
//! 1. Ask the [`RebuildCoordinator`] whether the tree is current, building
//!    it first when it is not. A failed check answers `500` with the error
//!    text, build output included.
//! 2. Map the URL path under the root (`403` when it escapes).
//! 3. Serve the file, redirect bare directory paths to their `/` form,
//!    serve `index.html`, or render a listing.

pub mod listing;
pub mod mime;
pub mod paths;

use crate::error::{CliError, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use fresh_core::RebuildCoordinator;
use paths::ResolveError;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by all request handlers.
#[derive(Debug)]
pub struct ServerState {
    pub coordinator: Arc<RebuildCoordinator>,
    /// Render listings for directories without an index.html
    pub listing: bool,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(coordinator: Arc<RebuildCoordinator>, listing: bool) -> SharedState {
        Arc::new(Self {
            coordinator,
            listing,
        })
    }
}

/// Build the router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns [`CliError::Server`] if the address cannot be bound or the
/// serve loop fails.
pub async fn run<F>(addr: &str, state: SharedState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    let local: SocketAddr = listener
        .local_addr()
        .map_err(|e| CliError::Server(format!("Failed to read bound address: {}", e)))?;
    crate::ui::banner(
        "Serving",
        &format!("{} at http://{}", state.coordinator.root().display(), local),
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CliError::Server(format!("Server error: {}", e)))
}

async fn handle_request(State(state): State<SharedState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
            "Method not allowed\n",
        )
            .into_response();
    }

    if let Err(err) = state.coordinator.rebuild_if_necessary().await {
        tracing::warn!("Rebuild check failed for {}: {}", uri.path(), err);
        return text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }

    let root = state.coordinator.root();
    let path = match paths::resolve(root, uri.path()) {
        Ok(path) => path,
        Err(ResolveError::Escapes) => return text(StatusCode::FORBIDDEN, "Forbidden\n"),
        Err(ResolveError::Malformed) => return text(StatusCode::BAD_REQUEST, "Bad request\n"),
    };

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(err) => return io_error_response(&path, err),
    };

    if metadata.is_file() {
        return serve_file(&path).await;
    }

    if !uri.path().ends_with('/') {
        return redirect_to_slash(&uri);
    }

    let index = path.join("index.html");
    if tokio::fs::metadata(&index)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
    {
        return serve_file(&index).await;
    }

    if !state.listing {
        return text(StatusCode::NOT_FOUND, "Not found\n");
    }

    match listing::read_entries(&path).await {
        Ok(entries) => {
            let url_path = urlencoding::decode(uri.path())
                .map(|p| p.into_owned())
                .unwrap_or_else(|_| uri.path().to_string());
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                listing::render(&url_path, &entries),
            )
                .into_response()
        }
        Err(err) => io_error_response(&path, err),
    }
}

async fn serve_file(path: &Path) -> Response {
    match tokio::fs::read(path).await {
        Ok(content) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::content_type(path)),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            content,
        )
            .into_response(),
        Err(err) => io_error_response(path, err),
    }
}

fn redirect_to_slash(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };
    match HeaderValue::try_from(location) {
        Ok(location) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, location)],
        )
            .into_response(),
        Err(_) => text(StatusCode::BAD_REQUEST, "Bad request\n"),
    }
}

fn io_error_response(path: &Path, err: std::io::Error) -> Response {
    match err.kind() {
        std::io::ErrorKind::NotFound => text(StatusCode::NOT_FOUND, "Not found\n"),
        std::io::ErrorKind::PermissionDenied => text(StatusCode::FORBIDDEN, "Forbidden\n"),
        _ => {
            tracing::warn!("Failed to read {}: {}", path.display(), err);
            text(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body.into(),
    )
        .into_response()
}
