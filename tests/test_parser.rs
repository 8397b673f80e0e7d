use tinyhttpd::http::parser::{ParseError, has_request_line, parse_request_line};
use tinyhttpd::http::request::Method;

#[test]
fn test_parse_simple_get_request() {
    let req = parse_request_line(b"GET /index.html HTTP/1.0\r\n\r\n").unwrap();

    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "index.html");
    assert_eq!(req.protocol, "HTTP/1.0");
}

#[test]
fn test_parse_ignores_headers() {
    let raw = b"HEAD /a HTTP/1.0\r\nHost: example.com\r\nBroken header\r\n\r\n";
    let req = parse_request_line(raw).unwrap();

    assert_eq!(req.method, Method::HEAD);
    assert_eq!(req.path, "a");
}

#[test]
fn test_parse_keeps_query_in_path() {
    let req = parse_request_line(b"GET /cgi-bin/run?a&b HTTP/1.0\r\n").unwrap();

    assert_eq!(req.path, "cgi-bin/run?a&b");
    assert_eq!(req.split_query(), ("cgi-bin/run", Some("a&b")));
}

#[test]
fn test_parse_root_path_becomes_empty() {
    let req = parse_request_line(b"GET / HTTP/1.0\r\n").unwrap();
    assert_eq!(req.path, "");
}

#[test]
fn test_parse_path_without_leading_slash() {
    let req = parse_request_line(b"GET index.html HTTP/1.0\r\n").unwrap();
    assert_eq!(req.path, "index.html");
}

#[test]
fn test_parse_protocol_not_validated() {
    let req = parse_request_line(b"GET /x SPDY/9\r\n").unwrap();
    assert_eq!(req.protocol, "SPDY/9");
}

#[test]
fn test_parse_tabs_and_repeated_spaces() {
    let req = parse_request_line(b"GET \t /x   HTTP/1.0\r\n").unwrap();
    assert_eq!(req.path, "x");
}

#[test]
fn test_parse_without_line_terminator() {
    let req = parse_request_line(b"GET /x HTTP/1.0").unwrap();
    assert_eq!(req.path, "x");
}

#[test]
fn test_parse_wrong_token_counts() {
    assert_eq!(parse_request_line(b""), Err(ParseError::WrongTokenCount(0)));
    assert_eq!(parse_request_line(b"GET\r\n"), Err(ParseError::WrongTokenCount(1)));
    assert_eq!(
        parse_request_line(b"GET /a HTTP/1.0 junk\r\n"),
        Err(ParseError::WrongTokenCount(4))
    );
}

#[test]
fn test_parse_invalid_utf8() {
    assert_eq!(
        parse_request_line(b"GET /\xff\xfe HTTP/1.0\r\n"),
        Err(ParseError::InvalidEncoding)
    );
}

#[test]
fn test_parse_unknown_method_is_kept() {
    let req = parse_request_line(b"BREW /pot HTTP/1.0\r\n").unwrap();
    assert_eq!(req.method, Method::Other("BREW".to_string()));
}

#[test]
fn test_has_request_line() {
    assert!(!has_request_line(b"GET /x HTT"));
    assert!(has_request_line(b"GET /x HTTP/1.0\r\n"));
}
