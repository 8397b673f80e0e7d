//! Content type detection based on file extensions.

use std::path::Path;

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content type for a static file.
///
/// Files without a recognised extension are sent as `text/html`, which is
/// what every static file got before extension detection existed.
pub fn from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    from_extension(&ext)
}

pub fn from_extension(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" => TEXT_HTML,
        "txt" | "log" => TEXT_PLAIN,
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "wasm" => "application/wasm",
        "bin" | "exe" | "so" => OCTET_STREAM,
        _ => TEXT_HTML,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(from_path(Path::new("a/b.PNG")), "image/png");
        assert_eq!(from_path(Path::new("notes.txt")), TEXT_PLAIN);
    }

    #[test]
    fn unknown_extension_is_html() {
        assert_eq!(from_path(Path::new("README")), TEXT_HTML);
    }
}
