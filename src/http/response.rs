use crate::http::headers::Headers;

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): Resource served
/// - `BadRequest` (400): Malformed request or unknown protocol version
/// - `Forbidden` (403): Resource lies outside the document root or is unreadable
/// - `NotFound` (404): No regular file at the resolved path
/// - `InternalServerError` (500): Reading the resource failed
/// - `NotImplemented` (501): Method other than GET or HEAD
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
    /// # use staticd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
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

    /// Returns the standard HTTP reason phrase for this status code.
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

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    /// Size of the entity. For HEAD responses this is the size the body
    /// would have had; `body` itself is then empty.
    pub content_length: u64,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(page)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    content_length: Option<u64>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            content_length: None,
        }
    }

    /// Appends a header. Existing headers with the same key are kept.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(key, value);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Overrides the entity length, for responses whose body is withheld.
    pub fn content_length(mut self, len: u64) -> Self {
        self.content_length = Some(len);
        self
    }

    /// Builds the final Response.
    ///
    /// The entity length defaults to the body size and is mirrored into a
    /// Content-Length header unless one was added explicitly.
    pub fn build(mut self) -> Response {
        let content_length = self.content_length.unwrap_or(self.body.len() as u64);

        if !self.headers.contains("Content-Length") {
            self.headers.add_int("Content-Length", content_length);
        }

        Response {
            status: self.status,
            content_length,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Drops the body, keeping the Content-Length of the entity.
    pub fn strip_body(&mut self) {
        self.body = Vec::new();
    }
}
