//! Plain-text directory listings

use std::path::Path;
use tokio::fs;

use crate::http::mime;
use crate::http::response::{Response, StatusCode};

pub const LISTING_HEADER: &str = "Directory: \n";

/// Lists `path` as `text/plain`.
///
/// The body starts with [`LISTING_HEADER`], then one name per line: `.` and
/// `..` first, then entries in whatever order the OS returns them. The
/// buffer grows as needed; there is no size limit.
pub async fn list(path: &Path) -> Response {
    let mut entries = match fs::read_dir(path).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Cannot open directory");
            return Response::error(StatusCode::NotFound, "Directory not found");
        }
    };

    let mut body = String::from(LISTING_HEADER);
    body.push_str(".\n..\n");

    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                body.push_str(&entry.file_name().to_string_lossy());
                body.push('\n');
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Directory read interrupted");
                break;
            }
        }
    }

    Response::ok(mime::TEXT_PLAIN, body)
}
