/// HTTP request methods.
///
/// Only GET and HEAD are served for static files. Other tokens are still
/// parsed because directory and CGI requests do not gate on the method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any other method token, kept verbatim
    Other(String),
}

impl Method {
    /// Parses an HTTP method token (case-sensitive).
    ///
    /// # Example
    ///
    /// ```
    /// # use tinyhttpd::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("get"), Method::Other("get".to_string()));
    /// ```
    pub fn parse(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "OPTIONS" => Method::OPTIONS,
            "PATCH" => Method::PATCH,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::Other(s) => s,
        }
    }

    /// True for the methods the static file server accepts.
    pub fn is_get_or_head(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

/// A parsed HTTP request line.
///
/// Headers are accepted on the wire but never looked at, so they are not
/// kept here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// Request path with a single leading `/` removed
    pub path: String,
    /// Protocol token as sent (e.g. "HTTP/1.0"), not validated
    pub protocol: String,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>, protocol: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            protocol: protocol.into(),
        }
    }

    /// Splits the path at the first `?`.
    ///
    /// Returns the part before it and, if a `?` was present, the raw query
    /// text after it (possibly empty).
    pub fn split_query(&self) -> (&str, Option<&str>) {
        match self.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (&self.path, None),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}
