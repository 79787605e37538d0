use staticd::http::parser::{ParseError, parse_http_request, parse_request_head};
use staticd::http::request::{Method, Version};

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::Get);
    assert_eq!(parsed.method_raw, "GET");
    assert_eq!(parsed.uri, "/");
    assert_eq!(parsed.version, Version::Http11);
    assert_eq!(parsed.version_raw.as_deref(), Some("HTTP/1.1"));
    assert_eq!(parsed.header("Host").unwrap(), "example.com");
    assert_eq!(parsed.content_length, None);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_head_http10() {
    let (parsed, _) = parse_http_request(b"HEAD /a.txt HTTP/1.0\r\n\r\n").unwrap();

    assert_eq!(parsed.method, Method::Head);
    assert_eq!(parsed.version, Version::Http10);
    assert!(parsed.headers.is_empty());
}

#[test]
fn test_parse_http09_request() {
    let req = b"GET /index.html\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method, Method::Get);
    assert_eq!(parsed.uri, "/index.html");
    assert_eq!(parsed.version, Version::Http09);
    assert_eq!(parsed.version_raw, None);
    assert_eq!(consumed, req.len());
}

#[test]
fn test_parse_multiple_headers_in_order() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    let keys: Vec<&str> = parsed.headers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["Host", "User-Agent", "Accept"]);
    assert_eq!(parsed.header("user-agent").unwrap(), "test-client");
    assert_eq!(parsed.header("Accept").unwrap(), "*/*");
}

#[test]
fn test_parse_duplicate_headers_are_kept() {
    let req = b"GET / HTTP/1.1\r\nX-A: 1\r\nx-a: 2\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 2);
    assert_eq!(parsed.headers.get_all("X-A").collect::<Vec<_>>(), vec!["1", "2"]);
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.uri, "/search?q=rust");
}

#[test]
fn test_parse_collapses_repeated_whitespace() {
    let req = b"GET  \t /spaced \t HTTP/1.0 \r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.method_raw, "GET");
    assert_eq!(parsed.uri, "/spaced");
    assert_eq!(parsed.version, Version::Http10);
}

#[test]
fn test_parse_trims_header_value_whitespace() {
    // Surrounding blanks are removed, inner ones kept.
    let req = b"GET / HTTP/1.1\r\nX-Note:   two  words \t \r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.header("X-Note").unwrap(), "two  words");
}

#[test]
fn test_parse_content_length() {
    let req = b"GET / HTTP/1.1\r\nContent-Length: 42\r\n\r\n";
    let (parsed, _) = parse_http_request(req).unwrap();

    assert_eq!(parsed.content_length, Some(42));
}

#[test]
fn test_parse_invalid_content_length() {
    for value in ["abc", "-1", "4 2", ""] {
        let req = format!("GET / HTTP/1.1\r\nContent-Length: {value}\r\n\r\n");
        assert_eq!(
            parse_http_request(req.as_bytes()).unwrap_err(),
            ParseError::InvalidContentLength,
            "value {value:?}"
        );
    }
}

#[test]
fn test_parse_incomplete_request_missing_blank_line() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::Incomplete)));
}

#[test]
fn test_parse_unsupported_method_keeps_raw_token() {
    let (parsed, _) = parse_http_request(b"POST /api HTTP/1.1\r\nContent-Length: 5\r\n\r\n").unwrap();

    assert_eq!(parsed.method, Method::NotSupported);
    assert_eq!(parsed.method_raw, "POST");
}

#[test]
fn test_parse_method_is_case_sensitive() {
    let (parsed, _) = parse_http_request(b"get / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.method, Method::NotSupported);
}

#[test]
fn test_parse_unknown_version_keeps_raw_token() {
    let (parsed, _) = parse_http_request(b"GET / BOGUS/9.9\r\n\r\n").unwrap();

    assert_eq!(parsed.version, Version::Unknown);
    assert_eq!(parsed.version_raw.as_deref(), Some("BOGUS/9.9"));
}

#[test]
fn test_parse_lowercase_version_is_unknown() {
    let (parsed, _) = parse_http_request(b"GET / http/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.version, Version::Unknown);
}

#[test]
fn test_parse_malformed_header() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\n\r\n";
    let result = parse_http_request(req);

    assert!(matches!(result, Err(ParseError::InvalidHeader)));
}

#[test]
fn test_parse_header_with_empty_key() {
    let result = parse_http_request(b"GET / HTTP/1.1\r\n: value\r\n\r\n");
    assert!(matches!(result, Err(ParseError::InvalidHeader)));
}

#[test]
fn test_parse_missing_uri() {
    assert_eq!(
        parse_http_request(b"GET\r\n").unwrap_err(),
        ParseError::MissingUri
    );
}

#[test]
fn test_parse_too_many_tokens() {
    assert_eq!(
        parse_http_request(b"GET / HTTP/1.1 extra\r\n\r\n").unwrap_err(),
        ParseError::InvalidRequestLine
    );
}

#[test]
fn test_parse_invalid_utf8() {
    assert_eq!(
        parse_request_head(b"GET /\xff\xfe HTTP/1.1\r\n\r\n").unwrap_err(),
        ParseError::InvalidEncoding
    );
}

#[test]
fn test_parse_empty_head() {
    assert_eq!(parse_request_head(b"\r\n").unwrap_err(), ParseError::MissingMethod);
}

#[test]
fn test_parse_skips_leading_blank_lines() {
    let (parsed, _) = parse_http_request(b"\r\n\r\nGET /x HTTP/1.0\r\n\r\n").unwrap();
    assert_eq!(parsed.uri, "/x");
}

#[test]
fn test_parse_stops_at_end_of_head() {
    let req = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nGET /second HTTP/1.1\r\nBroken\r\n\r\n";
    let (parsed, consumed) = parse_http_request(req).unwrap();

    assert_eq!(parsed.uri, "/");
    assert_eq!(consumed, b"GET / HTTP/1.1\r\nHost: a\r\n\r\n".len());
}
