//! HTTP protocol implementation.
//!
//! This module implements a static-file origin server for HTTP/0.9, 1.0 and
//! 1.1 request lines. Every connection carries exactly one request.
//!
//! # Architecture
//!
//! - **`headers`**: Ordered header container with case-insensitive lookup
//! - **`detector`**: Decides incrementally when a request head has arrived
//! - **`parser`**: Parses a complete request head into a [`request::Request`]
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`resolver`**: Maps requests to files below the document root
//! - **`mime`**: MIME type detection based on file extensions
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`connection`**: The per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Receiving  │ ← Read until the detector reports a complete head
//!        └──────┬──────┘
//!               │ Head complete            (EOF / read error → Closed, no response)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Parse and resolve; syntax errors become 400
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use staticd::http::resolver::Resolver;
//! use staticd::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::new("/srv/www")?;
//!     Server::bind("127.0.0.1:8080", resolver).await?.run().await
//! }
//! ```

pub mod headers;
pub mod detector;
pub mod parser;
pub mod request;
pub mod response;
pub mod resolver;
pub mod mime;
pub mod writer;
pub mod connection;
