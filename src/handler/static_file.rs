//! Static file service

use std::path::Path;
use tokio::fs::File;

use crate::http::mime;
use crate::http::response::{Response, StatusCode};

/// Opens `path` and builds a streaming response for it.
///
/// The caller decides whether the body is sent (GET) or only the headers
/// (HEAD); the `Content-Length` is the same either way.
pub async fn serve(path: &Path) -> Response {
    let file = match File::open(path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Cannot open file");
            return Response::error(StatusCode::NotFound, "File not found");
        }
    };

    let meta = match file.metadata().await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot stat open file");
            return Response::error(StatusCode::Forbidden, "Access denied (wrong file type)");
        }
    };

    if !meta.is_file() {
        // `file` is dropped here, closing the handle
        return Response::error(StatusCode::Forbidden, "Access denied (wrong file type)");
    }

    Response::file(mime::from_path(path), file, meta.len())
}
