use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::http::detector::{Progress, RequestDetector};
use crate::http::parser::{parse_request_head, request_line_tokens, ParseError};
use crate::http::request::{Method, Request};
use crate::http::resolver::Resolver;
use crate::http::response::StatusCode;
use crate::http::writer::{Framing, ResponseWriter};
use crate::logging::AccessRecord;

/// Size of a single socket read.
const READ_CHUNK: usize = 512;

/// Largest request head accepted. Longer heads are answered with 400.
pub const MAX_HEAD: usize = 8 * 1024;

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    buffer: BytesMut,
    detector: RequestDetector,
    resolver: Arc<Resolver>,
    state: ConnectionState,
    real_path: Option<PathBuf>,
}

pub enum ConnectionState {
    Receiving,
    /// The request head occupies the first `usize` bytes of the buffer.
    Processing(usize),
    Writing(ResponseWriter, AccessRecord),
    Closed,
}

/// How a connection ended.
#[derive(Debug)]
pub enum Outcome {
    /// A response was sent.
    Served(AccessRecord),
    /// The peer closed the connection before a request was complete.
    Aborted,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, resolver: Arc<Resolver>) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            detector: RequestDetector::new(),
            resolver,
            state: ConnectionState::Receiving,
            real_path: None,
        }
    }

    /// Drives the connection through receive, parse, resolve and send.
    ///
    /// Read and write failures abandon the connection and are returned as
    /// errors; malformed requests still get a response.
    pub async fn run(&mut self) -> anyhow::Result<Outcome> {
        let mut outcome = Outcome::Aborted;

        loop {
            match &mut self.state {
                ConnectionState::Receiving => {
                    self.state = match self.read_request().await? {
                        Some(end) => ConnectionState::Processing(end),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(end) => {
                    let parsed = if *end > MAX_HEAD {
                        Err(ParseError::HeadTooLarge)
                    } else {
                        parse_request_head(&self.buffer[..*end])
                    };
                    if let Err(e) = &parsed {
                        tracing::debug!(peer = %self.peer, error = %e, "Malformed request");
                    }

                    let resolution = self.resolver.resolve(parsed.as_ref()).await;
                    let response = resolution.response;
                    self.real_path = resolution.real_path;

                    let record = self.access_record(&parsed, response.status, response.content_length);
                    let writer = ResponseWriter::new(&response, Framing::for_request(parsed.as_ref()));
                    self.state = ConnectionState::Writing(writer, record);
                }

                ConnectionState::Writing(writer, record) => {
                    writer
                        .write_to_stream(&mut self.stream)
                        .await
                        .context("failed to send response")?;

                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(peer = %self.peer, error = %e, "Shutdown after response failed");
                    }

                    outcome = Outcome::Served(record.clone());
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Reads until the detector reports a complete head.
    ///
    /// Returns the length of the head, or `None` when the peer closed the
    /// connection first. Reading stops once more than [`MAX_HEAD`] bytes
    /// arrived without a complete head; the whole buffer is then returned.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<usize>> {
        loop {
            self.buffer.reserve(READ_CHUNK);
            let start = self.buffer.len();
            let n = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .context("failed to read request")?;

            if n == 0 {
                // Client closed connection
                return Ok(None);
            }

            match self.detector.feed(&self.buffer[start..]) {
                Progress::NeedMore if self.buffer.len() > MAX_HEAD => {
                    return Ok(Some(self.buffer.len()));
                }
                Progress::NeedMore => {}
                Progress::Complete(end) | Progress::Malformed(end) => return Ok(Some(end)),
            }
        }
    }

    /// Path the request resolved to, if resolution reached the filesystem.
    pub fn real_path(&self) -> Option<&PathBuf> {
        self.real_path.as_ref()
    }

    fn access_record(
        &self,
        parsed: &Result<Request, ParseError>,
        status: StatusCode,
        content_length: u64,
    ) -> AccessRecord {
        let (method, uri, version) = match parsed {
            Ok(req) => (
                Some(req.method_raw.clone()),
                Some(req.uri.clone()),
                req.version_raw.clone(),
            ),
            Err(_) => {
                let end = match self.state {
                    ConnectionState::Processing(end) => end,
                    _ => self.buffer.len(),
                };
                let mut tokens = request_line_tokens(&self.buffer[..end]).into_iter();
                (tokens.next(), tokens.next(), tokens.next())
            }
        };

        let is_head = matches!(parsed, Ok(req) if req.method == Method::Head);

        AccessRecord::now(
            self.peer.ip(),
            method,
            uri,
            version,
            status.as_u16(),
            (!is_head).then_some(content_length),
        )
    }
}

/// Serves one accepted connection and reports how it ended.
pub async fn serve(stream: TcpStream, peer: SocketAddr, resolver: Arc<Resolver>) {
    let mut conn = Connection::new(stream, peer, resolver);

    match conn.run().await {
        Ok(Outcome::Served(record)) => {
            tracing::info!(target: "access", "{record}");
            tracing::debug!(
                peer = %peer,
                path = ?conn.real_path(),
                "Connection served"
            );
        }
        Ok(Outcome::Aborted) => {
            tracing::debug!(peer = %peer, "Connection closed before a complete request");
        }
        Err(e) => {
            tracing::error!("Connection error from {}: {:#}", peer, e);
        }
    }
}
