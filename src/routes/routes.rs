//! Defines routes for the file store.
//!
//! ## Structure
//! - **Health endpoints**
//!   - `GET    /healthz`, `GET /readyz`
//!
//! - **File tree endpoints** (`{*path}` may be nested, e.g. `docs/2025/a.txt`)
//!   - `GET    /file`:        list the root directory
//!   - `GET    /file/{*path}`: download a file, or list a directory
//!   - `POST   /file/{*path}`: create a file (multipart field `file`)
//!   - `PATCH  /file/{*path}`: replace a file's content
//!   - `DELETE /file/{*path}`: archive a file
//!
//! Whether `path` is a file or a directory is decided by its extension.

use crate::{
    handlers::{
        file_handlers::{create_file, delete_file, get_file, get_root, update_file},
        health_handlers::{healthz, readyz},
    },
    services::file_repository::FileRepository,
};
use axum::{Router, extract::DefaultBodyLimit, http::StatusCode, routing::get};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build and return the router for all file store routes.
///
/// The router carries shared state (`FileRepository`) to all handlers.
/// Request bodies above `max_upload_bytes` are refused with 413, and
/// requests running past `request_timeout` get 408.
pub fn routes(max_upload_bytes: usize, request_timeout: Duration) -> Router<FileRepository> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // File tree routes
        .route("/file", get(get_root))
        .route(
            "/file/{*path}",
            get(get_file)
                .post(create_file)
                .patch(update_file)
                .delete(delete_file),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(timeout_layer(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Requests still running after `request_timeout` are answered with 408.
fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}
