//! Mapping of parsed requests onto files below the document root.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use url::Url;

use crate::http::mime;
use crate::http::parser::ParseError;
use crate::http::request::{Method, Request, Version};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::jail;

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = concat!("staticd/", env!("CARGO_PKG_VERSION"));

/// File served when the target is a directory.
pub const INDEX_FILE: &str = "index.html";

/// Base the request target is resolved against; only its path is used.
const BASE_URL: &str = "http://localhost/";

/// Outcome of resolving one request.
#[derive(Debug)]
pub struct Resolution {
    pub response: Response,
    /// Filesystem path the target resolved to, when resolution got that far.
    pub real_path: Option<PathBuf>,
}

/// Resolves requests against a fixed document root.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    /// The document root is canonicalized once; it must exist.
    pub fn new(document_root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(document_root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn document_root(&self) -> &Path {
        &self.root
    }

    /// Produces the response for a parse outcome.
    ///
    /// Rejection order: syntax errors and unknown versions (400), then
    /// unsupported methods (501), then path resolution (403/404), and only
    /// then the file is read.
    pub async fn resolve(&self, parsed: Result<&Request, &ParseError>) -> Resolution {
        let request = match parsed {
            Ok(request) if request.version != Version::Unknown => request,
            _ => return self.reject(StatusCode::BadRequest, None),
        };

        if request.method == Method::NotSupported {
            return self.reject(StatusCode::NotImplemented, None);
        }

        let mut resolution = match self.locate(&request.uri).await {
            Ok(path) => self.serve(request.method, path).await,
            Err((status, real_path)) => self.reject(status, real_path),
        };

        if request.method == Method::Head {
            resolution.response.strip_body();
        }
        resolution
    }

    /// Finds the regular file addressed by `uri`.
    async fn locate(&self, uri: &str) -> Result<PathBuf, (StatusCode, Option<PathBuf>)> {
        let relative = target_path(uri).map_err(|status| (status, None))?;
        let candidate = self.root.join(relative);

        let path = self.confine(&candidate).await?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| (status_for(&e), Some(path.clone())))?;

        if metadata.is_file() {
            return Ok(path);
        }
        if !metadata.is_dir() {
            return Err((StatusCode::NotFound, Some(path)));
        }

        // The index may itself be a symlink, so it is confined again.
        let index = self.confine(&path.join(INDEX_FILE)).await?;
        match tokio::fs::metadata(&index).await {
            Ok(m) if m.is_file() => Ok(index),
            Ok(_) => Err((StatusCode::NotFound, Some(index))),
            Err(e) => Err((status_for(&e), Some(index))),
        }
    }

    async fn confine(&self, candidate: &Path) -> Result<PathBuf, (StatusCode, Option<PathBuf>)> {
        let canonical = tokio::fs::canonicalize(candidate)
            .await
            .map_err(|e| (status_for(&e), Some(candidate.to_path_buf())))?;

        if let Err(e) = jail::ensure_within(&self.root, &canonical) {
            tracing::warn!(error = %e, "Request escaped the document root");
            return Err((StatusCode::Forbidden, Some(canonical)));
        }
        Ok(canonical)
    }

    async fn serve(&self, method: Method, path: PathBuf) -> Resolution {
        let content_type = mime::content_type_for(&path);

        let response = match method {
            Method::Head => match tokio::fs::metadata(&path).await {
                Ok(metadata) => self
                    .base(StatusCode::Ok, content_type)
                    .content_length(metadata.len())
                    .build(),
                Err(e) => return self.reject(status_for(&e), Some(path)),
            },
            _ => match tokio::fs::read(&path).await {
                Ok(body) => self.base(StatusCode::Ok, content_type).body(body).build(),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read file");
                    return self.reject(read_failure_status(&e), Some(path));
                }
            },
        };

        Resolution {
            response,
            real_path: Some(path),
        }
    }

    fn reject(&self, status: StatusCode, real_path: Option<PathBuf>) -> Resolution {
        let response = self
            .base(status, "text/plain")
            .body(format!("{status}\n").into_bytes())
            .build();

        Resolution {
            response,
            real_path,
        }
    }

    /// Headers common to every response, in wire order. Content-Length is
    /// appended by the builder.
    fn base(&self, status: StatusCode, content_type: &str) -> ResponseBuilder {
        ResponseBuilder::new(status)
            .header("Server", SERVER_NAME)
            .header("Date", http_date())
            .header("Content-Type", content_type)
            .header("Connection", "close")
    }
}

/// Turns a request target into a relative path below the document root.
///
/// Query and fragment are dropped, dot segments are removed, and each
/// segment is percent-decoded. Segments that decode to something able to
/// change the directory structure are refused.
pub fn target_path(uri: &str) -> Result<PathBuf, StatusCode> {
    let url = Url::parse(BASE_URL)
        .and_then(|base| base.join(uri))
        .map_err(|_| StatusCode::BadRequest)?;
    let segments = url.path_segments().ok_or(StatusCode::BadRequest)?;

    let mut path = PathBuf::new();
    for segment in segments.filter(|s| !s.is_empty()) {
        let decoded = percent_decode(segment).ok_or(StatusCode::BadRequest)?;
        if decoded == "." || decoded == ".." || decoded.contains(['/', '\\', '\0']) {
            return Err(StatusCode::BadRequest);
        }
        path.push(decoded);
    }
    Ok(path)
}

/// Decodes `%XX` escapes. Returns `None` for malformed escapes or when the
/// result is not UTF-8.
fn percent_decode(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

fn status_for(err: &io::Error) -> StatusCode {
    match err.kind() {
        io::ErrorKind::PermissionDenied => StatusCode::Forbidden,
        _ => StatusCode::NotFound,
    }
}

fn read_failure_status(err: &io::Error) -> StatusCode {
    match err.kind() {
        io::ErrorKind::PermissionDenied => StatusCode::Forbidden,
        _ => StatusCode::InternalServerError,
    }
}

/// Current time in IMF-fixdate form, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_drops_query_and_dot_segments() {
        assert_eq!(
            target_path("/docs/./a/../b.txt?x=1#top").unwrap(),
            PathBuf::from("docs/b.txt")
        );
        assert_eq!(target_path("/../../etc/passwd").unwrap(), PathBuf::from("etc/passwd"));
        assert_eq!(target_path("/").unwrap(), PathBuf::new());
    }

    #[test]
    fn target_path_accepts_absolute_form() {
        assert_eq!(
            target_path("http://example.com/a.txt").unwrap(),
            PathBuf::from("a.txt")
        );
    }

    #[test]
    fn target_path_decodes_segments() {
        assert_eq!(target_path("/my%20file.txt").unwrap(), PathBuf::from("my file.txt"));
    }

    #[test]
    fn target_path_refuses_encoded_separators() {
        assert_eq!(target_path("/a%2f..%2f..%2fetc"), Err(StatusCode::BadRequest));
        assert_eq!(target_path("/a%5cb"), Err(StatusCode::BadRequest));
        assert_eq!(target_path("/a%00b"), Err(StatusCode::BadRequest));
        assert_eq!(target_path("/bad%zz"), Err(StatusCode::BadRequest));
        assert_eq!(target_path("/trunc%2"), Err(StatusCode::BadRequest));
    }
}
