use crate::http::headers::Headers;

/// HTTP request methods understood by the server.
///
/// Only GET and HEAD are served. Any other token is classified as
/// `NotSupported`; the raw token is kept on the [`Request`] for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
    /// HEAD - Like GET but without the response body
    Head,
    /// Any other method token
    NotSupported,
}

impl Method {
    /// Classifies a method token. Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use staticd::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::Get);
    /// assert_eq!(Method::from_token("get"), Method::NotSupported);
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            _ => Method::NotSupported,
        }
    }
}

/// Protocol version named on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// No version token: a simple request.
    Http09,
    Http10,
    Http11,
    /// A version token that is not `HTTP/1.0` or `HTTP/1.1`.
    Unknown,
}

impl Version {
    /// Classifies the optional version token of a request line.
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            None => Version::Http09,
            Some("HTTP/1.0") => Version::Http10,
            Some("HTTP/1.1") => Version::Http11,
            Some(_) => Version::Unknown,
        }
    }

    /// Whether requests of this version carry a header block.
    pub fn has_headers(&self) -> bool {
        matches!(self, Version::Http10 | Version::Http11)
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Requests are built once by [`parse_request_head`] and not modified
/// afterwards.
///
/// [`parse_request_head`]: crate::http::parser::parse_request_head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// The method token exactly as sent
    pub method_raw: String,
    /// The request target as sent, not yet resolved
    pub uri: String,
    pub version: Version,
    /// The version token exactly as sent; absent for HTTP/0.9
    pub version_raw: Option<String>,
    pub headers: Headers,
    /// Value of the Content-Length header, if one was sent
    pub content_length: Option<u64>,
}

impl Request {
    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name to look up
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the first matching value, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}
