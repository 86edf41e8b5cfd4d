//! Static file fallback for non-API traffic.
//!
//! [`StaticFiles`] wraps `tower-http`'s `ServeDir` behind an explicit
//! value handed to the relay handler, so the forwarding logic and the
//! fallback can be exercised independently. Standard file-server
//! semantics apply: 404 for missing files, 405 for methods `ServeDir`
//! does not handle.

use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    serve_dir: ServeDir,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            serve_dir: ServeDir::new(root),
        }
    }

    pub async fn serve(&self, req: Request<Body>) -> Response {
        match self.serve_dir.clone().oneshot(req).await {
            Ok(response) => response.into_response(),
            // ServeDir converts IO errors into 500 responses itself
            Err(err) => match err {},
        }
    }
}
