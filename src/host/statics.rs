//! Built-in static-file view.

use std::path::{Component, Path, PathBuf};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::host::ViewArgs;
use crate::view::ViewFn;

/// Build the host's static-file view over `root`.
///
/// The file to serve is taken from the `filename` view argument, which comes
/// either from a path parameter (`/static/{*filename}`) or from the rule's
/// default arguments (`add_static("/favicon.ico", Some("img/favicon.ico"))`).
pub fn static_view(root: Option<PathBuf>) -> ViewFn {
    ViewFn::new(move |req| {
        let root = root.clone();
        async move {
            let Some(root) = root else {
                tracing::warn!("static view hit but host has no static root");
                return StatusCode::NOT_FOUND.into_response();
            };
            let filename = req
                .extensions()
                .get::<ViewArgs>()
                .and_then(|args| args.get_str("filename"))
                .map(str::to_owned);
            let Some(filename) = filename else {
                return StatusCode::NOT_FOUND.into_response();
            };
            serve_file(&root, &filename).await
        }
    })
    .with_doc("Serve a file from the host's static root.")
}

async fn serve_file(root: &Path, filename: &str) -> Response {
    if !is_safe_relative(filename) {
        tracing::warn!(filename, "rejected unsafe static path");
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = root.join(filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, content_type_for(filename))],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "static file not readable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Only plain relative paths are served: no parent components, no absolute
/// paths, no drive prefixes.
fn is_safe_relative(filename: &str) -> bool {
    let path = Path::new(filename);
    !filename.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
