use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::parser::ParseError;
use crate::http::request::{Request, Version};
use crate::http::response::Response;

/// How a response is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Status line and headers, then the body.
    Full(&'static str),
    /// HTTP/0.9 simple response: the body alone.
    Simple,
}

impl Framing {
    /// Chooses the framing that matches the request.
    ///
    /// HTTP/1.1 clients get an `HTTP/1.1` status line, everyone else
    /// `HTTP/1.0`. Only a well-formed HTTP/0.9 request gets a simple response.
    pub fn for_request(parsed: Result<&Request, &ParseError>) -> Self {
        match parsed.map(|r| r.version) {
            Ok(Version::Http09) => Framing::Simple,
            Ok(Version::Http11) => Framing::Full("HTTP/1.1"),
            _ => Framing::Full("HTTP/1.0"),
        }
    }
}

pub fn serialize_response(resp: &Response, framing: Framing) -> Vec<u8> {
    let version = match framing {
        Framing::Simple => return resp.body.clone(),
        Framing::Full(version) => version,
    };

    let mut buf = Vec::with_capacity(256 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers, in insertion order
    for (k, v) in resp.headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, framing: Framing) -> Self {
        Self {
            buffer: serialize_response(response, framing),
            written: 0,
        }
    }

    pub async fn write_to_stream(
        &mut self,
        stream: &mut TcpStream,
    ) -> anyhow::Result<()> {
        while self.written < self.buffer.len() {
            let n = stream
                .write(&self.buffer[self.written..])
                .await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
