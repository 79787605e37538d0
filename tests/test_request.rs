use staticd::http::parser::parse_request_head;
use staticd::http::request::{Method, Request, Version};

fn request(raw: &str) -> Request {
    parse_request_head(raw.as_bytes()).unwrap()
}

#[test]
fn test_request_header_retrieval() {
    let req = request("GET / HTTP/1.1\r\nHost: example.com\r\nContent-Type: application/json\r\n\r\n");

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_content_length_from_header() {
    let req = request("GET / HTTP/1.1\r\nContent-Length: 42\r\n\r\n");
    assert_eq!(req.content_length, Some(42));
}

#[test]
fn test_request_content_length_missing() {
    let req = request("GET / HTTP/1.1\r\n\r\n");
    assert_eq!(req.content_length, None);
}

#[test]
fn test_request_without_version_is_http09() {
    let req = request("GET /\r\n");

    assert_eq!(req.version, Version::Http09);
    assert_eq!(req.version_raw, None);
    assert!(req.headers.is_empty());
}

#[test]
fn test_request_method_from_token() {
    assert_eq!(Method::from_token("GET"), Method::Get);
    assert_eq!(Method::from_token("HEAD"), Method::Head);
    assert_eq!(Method::from_token("POST"), Method::NotSupported);
    assert_eq!(Method::from_token("get"), Method::NotSupported); // Case-sensitive
}

#[test]
fn test_request_version_from_token() {
    assert_eq!(Version::from_token(None), Version::Http09);
    assert_eq!(Version::from_token(Some("HTTP/1.0")), Version::Http10);
    assert_eq!(Version::from_token(Some("HTTP/1.1")), Version::Http11);
    assert_eq!(Version::from_token(Some("HTTP/2.0")), Version::Unknown);
    assert_eq!(Version::from_token(Some("BOGUS/9.9")), Version::Unknown);
}

#[test]
fn test_request_version_header_block() {
    assert!(!Version::Http09.has_headers());
    assert!(Version::Http10.has_headers());
    assert!(Version::Http11.has_headers());
    assert!(!Version::Unknown.has_headers());
}

#[test]
fn test_request_keeps_raw_tokens() {
    let req = request("PATCH /x HTTP/3\r\n\r\n");

    assert_eq!(req.method, Method::NotSupported);
    assert_eq!(req.method_raw, "PATCH");
    assert_eq!(req.version, Version::Unknown);
    assert_eq!(req.version_raw.as_deref(), Some("HTTP/3"));
}

#[test]
fn test_request_headers_skipped_for_unknown_version() {
    let req = request("GET / HTTP/3\r\nHost: example.com\r\n\r\n");

    assert!(req.headers.is_empty());
    assert_eq!(req.header("Host"), None);
}
