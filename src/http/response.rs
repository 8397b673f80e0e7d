use tempfile::TempPath;
use tokio::fs::File;

use crate::http::mime;

pub const HTTP_VERSION: &str = "HTTP/1.0";

/// HTTP status codes produced by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// Response payload.
#[derive(Debug)]
pub enum Body {
    /// Fully buffered bytes (errors, directory listings)
    Bytes(Vec<u8>),
    /// An open file streamed in chunks; `len` is its size at open time and
    /// caps the number of bytes sent.
    File {
        file: File,
        len: u64,
        /// Removed from disk when the response is dropped
        cleanup: Option<TempPath>,
    },
}

impl Body {
    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete HTTP response ready to be written to a client.
///
/// Every response carries exactly two headers: `Content-Type` and
/// `Content-Length`. The length is derived from the body, never set by hand.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Body,
    /// Send the headers only (HEAD requests)
    pub head_only: bool,
}

impl Response {
    pub fn new(status: StatusCode, content_type: &'static str, body: Body) -> Self {
        Self {
            status,
            content_type,
            body,
            head_only: false,
        }
    }

    /// A 200 response with a buffered body.
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::Ok, content_type, Body::Bytes(body.into()))
    }

    /// A 200 response streaming an already opened file of `len` bytes.
    pub fn file(content_type: &'static str, file: File, len: u64) -> Self {
        Self::new(
            StatusCode::Ok,
            content_type,
            Body::File {
                file,
                len,
                cleanup: None,
            },
        )
    }

    /// Error envelope: `text/html`, the message followed by a newline.
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::response::{Response, StatusCode};
    /// let resp = Response::error(StatusCode::NotFound, "File not found");
    /// assert_eq!(resp.content_length(), 15);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        let mut body = Vec::with_capacity(message.len() + 1);
        body.extend_from_slice(message.as_bytes());
        body.push(b'\n');
        Self::new(status, mime::TEXT_HTML, Body::Bytes(body))
    }

    /// Marks the response as headers-only.
    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }

    /// Attaches a temporary file that is deleted once the response is gone.
    pub fn with_cleanup(mut self, path: TempPath) -> Self {
        if let Body::File { cleanup, .. } = &mut self.body {
            *cleanup = Some(path);
        }
        self
    }

    /// The `Content-Length` header value; always the exact body size.
    pub fn content_length(&self) -> u64 {
        self.body.len()
    }

    /// Serialized status line and headers, including the blank line.
    pub fn head(&self) -> Vec<u8> {
        head(self.status, self.content_type, self.content_length())
    }
}

/// Formats the status line and the two headers shared by every response.
pub fn head(status: StatusCode, content_type: &str, content_length: u64) -> Vec<u8> {
    format!(
        "{} {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase(),
        content_type,
        content_length
    )
    .into_bytes()
}
