use crate::http::request::{Method, Request};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Request bytes are not valid UTF-8
    InvalidEncoding,
    /// The request line did not have exactly three tokens
    WrongTokenCount(usize),
}

/// Parses the request line of a raw HTTP request.
///
/// Only the first line is examined; anything after it (headers, body) is
/// ignored. Exactly three whitespace-separated tokens are required. A single
/// leading `/` is stripped from the path.
pub fn parse_request_line(buf: &[u8]) -> Result<Request, ParseError> {
    let line_end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    let line = std::str::from_utf8(&buf[..line_end]).map_err(|_| ParseError::InvalidEncoding)?;

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &[method, path, protocol] = tokens.as_slice() else {
        return Err(ParseError::WrongTokenCount(tokens.len()));
    };

    let path = path.strip_prefix('/').unwrap_or(path);

    Ok(Request::new(Method::parse(method), path, protocol))
}

/// True once `buf` holds a complete request line.
pub fn has_request_line(buf: &[u8]) -> bool {
    buf.contains(&b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let raw = b"GET /index.html HTTP/1.0\r\nHost: example.com\r\n\r\n";
        let req = parse_request_line(raw).unwrap();

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "index.html");
        assert_eq!(req.protocol, "HTTP/1.0");
    }

    #[test]
    fn leaves_extra_slashes_for_routing() {
        let req = parse_request_line(b"GET //etc/passwd HTTP/1.0\r\n").unwrap();
        assert_eq!(req.path, "/etc/passwd");
    }

    #[test]
    fn two_tokens_rejected() {
        assert_eq!(
            parse_request_line(b"GET /index.html\r\n"),
            Err(ParseError::WrongTokenCount(2))
        );
    }
}
