use thiserror::Error;

use crate::http::detector::{Progress, RequestDetector};
use crate::http::headers::Headers;
use crate::http::request::{Method, Request, Version};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request head is not complete")]
    Incomplete,
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("request line has no method")]
    MissingMethod,
    #[error("request line has no URI")]
    MissingUri,
    #[error("request line has more than three tokens")]
    InvalidRequestLine,
    #[error("header line without a key/value separator")]
    InvalidHeader,
    #[error("Content-Length is not a non-negative integer")]
    InvalidContentLength,
    #[error("request head is larger than the server accepts")]
    HeadTooLarge,
}

/// Detects and parses a request head at the start of `buf`.
///
/// Returns the request together with the number of bytes the head occupies.
/// `ParseError::Incomplete` means more input is needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let end = match RequestDetector::new().feed(buf) {
        Progress::NeedMore => return Err(ParseError::Incomplete),
        Progress::Complete(end) | Progress::Malformed(end) => end,
    };

    let request = parse_request_head(&buf[..end])?;
    Ok((request, end))
}

/// Parses a request head already judged complete by the detector.
pub fn parse_request_head(head: &[u8]) -> Result<Request, ParseError> {
    let text = std::str::from_utf8(head).map_err(|_| ParseError::InvalidEncoding)?;

    let mut lines = text.split('\n').map(strip_cr);

    // Blank lines ahead of the request line are skipped
    let request_line = lines
        .by_ref()
        .find(|line| !line.trim().is_empty())
        .ok_or(ParseError::MissingMethod)?;

    let mut parts = request_line.split_ascii_whitespace();
    let method_raw = parts.next().ok_or(ParseError::MissingMethod)?;
    let uri = parts.next().ok_or(ParseError::MissingUri)?;
    let version_raw = parts.next();
    if parts.next().is_some() {
        return Err(ParseError::InvalidRequestLine);
    }

    let version = Version::from_token(version_raw);

    let mut headers = Headers::new();
    if version.has_headers() {
        for line in lines {
            if line.is_empty() {
                break;
            }
            let (key, value) = parse_header_line(line)?;
            headers.add(key, value);
        }
    }

    let content_length = headers
        .get("Content-Length")
        .map(|v| v.parse::<u64>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?;

    Ok(Request {
        method: Method::from_token(method_raw),
        method_raw: method_raw.to_string(),
        uri: uri.to_string(),
        version,
        version_raw: version_raw.map(str::to_string),
        headers,
        content_length,
    })
}

/// Splits `Key: Value`, trimming whitespace around both parts.
fn parse_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::InvalidHeader);
    }
    Ok((key, value.trim()))
}

fn strip_cr(line: &str) -> &str {
    line.trim_end_matches('\r')
}

/// Best-effort tokens of the first non-blank line, for logging requests
/// that failed to parse.
pub fn request_line_tokens(buf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buf)
        .split('\n')
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .map(|line| {
            line.split_ascii_whitespace()
                .take(3)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
